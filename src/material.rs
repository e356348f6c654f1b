//! Compact material models for refractive index and loss.
//!
//! A material property (effective index or loss) can be described by several
//! representations at once: a constant, a per-sweep-point sampled list, a
//! wavelength-dispersion Taylor expansion and a width-dispersion Taylor
//! expansion. Evaluation starts from the base value (constant or sampled)
//! and adds whichever dispersion models are attached.
//!
//! The base value is a tagged enum, so a constant and a sampled list can
//! never be held at the same time; precedence is structural rather than an
//! accident of assignment order.

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;


/// How higher-order Taylor terms combine with the leading coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Reduction {
    /// `y = a0 - a1*dx - a2*dx^2 - ...`, used for wavelength dispersion.
    Subtract,
    /// `y = b0 + b1*dx + b2*dx^2 + ...`, used for width dispersion.
    Add,
}

/// Taylor expansion of a material property about a reference point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaylorExpansion {
    pub x0: f64,
    pub coeffs: Vec<f64>,
    pub reduction: Reduction,
}

impl TaylorExpansion {
    fn new(x0: f64, coeffs: Vec<f64>, reduction: Reduction) -> Result<Self> {
        if coeffs.is_empty() {
            bail!("taylor expansion model requires at least one coefficient");
        }
        Ok(Self {
            x0,
            coeffs,
            reduction,
        })
    }

    /// Wavelength dispersion model: `n(l) = a0 - a1*(l-l0) - a2*(l-l0)^2 - ...`
    pub fn wavelength(x0: f64, coeffs: Vec<f64>) -> Result<Self> {
        Self::new(x0, coeffs, Reduction::Subtract)
    }

    /// Width dispersion model: `dn(w) = b0 + b1*(w-w0) + b2*(w-w0)^2 + ...`
    pub fn width(x0: f64, coeffs: Vec<f64>) -> Result<Self> {
        Self::new(x0, coeffs, Reduction::Add)
    }

    /// Evaluates the expansion at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.x0;
        let mut y = self.coeffs[0];
        for (i, c) in self.coeffs.iter().enumerate().skip(1) {
            let term = c * dx.powi(i as i32);
            y = match self.reduction {
                Reduction::Subtract => y - term,
                Reduction::Add => y + term,
            };
        }
        y
    }
}

/// Base value of a material property, before dispersion refinements.
#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    Constant(f64),
    Sampled(Vec<f64>),
}

/// A single material property (index or loss) with optional representations.
///
/// **Context**: Grating materials are rarely described the same way twice:
/// measurement campaigns yield per-wavelength samples, foundry compact models
/// yield Taylor expansions in wavelength and waveguide width, and quick
/// studies use plain constants. A sweep needs to evaluate any mix of these
/// through one interface.
///
/// **How it Works**: Holds an optional tagged base value plus optional
/// wavelength and width expansion models. [`Material::evaluate`] resolves the
/// base (constant, or the sample at the sweep index) and adds the evaluation
/// of each attached model. A fully empty material evaluates to 0.0; callers
/// are expected to have validated that required properties are configured.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "MaterialSpec")]
pub struct Material {
    pub base: Option<Base>,
    pub wavelength_model: Option<TaylorExpansion>,
    pub width_model: Option<TaylorExpansion>,
}

impl Material {
    /// Builds a material from a plain list of values: one value is a
    /// constant, several are per-sweep-point samples.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let base = match values {
            [] => bail!("material property requires at least one value"),
            [v] => Base::Constant(*v),
            _ => Base::Sampled(values.to_vec()),
        };
        Ok(Self {
            base: Some(base),
            ..Default::default()
        })
    }

    pub fn from_wavelength_model(model: TaylorExpansion) -> Self {
        Self {
            wavelength_model: Some(model),
            ..Default::default()
        }
    }

    pub fn from_width_model(model: TaylorExpansion) -> Self {
        Self {
            width_model: Some(model),
            ..Default::default()
        }
    }

    /// True if the base value is a sampled list.
    pub fn is_sampled(&self) -> bool {
        matches!(self.base, Some(Base::Sampled(_)))
    }

    /// Evaluates the property at a wavelength, width and sweep index.
    ///
    /// The sweep index selects the sample of a sampled base; an index past
    /// the end of the sample list is a fatal domain error.
    pub fn evaluate(&self, wavelength: f64, width: f64, index: usize) -> Result<f64> {
        let mut prop = match &self.base {
            None => 0.0,
            Some(Base::Constant(c)) => *c,
            Some(Base::Sampled(samples)) => *samples.get(index).ok_or_else(|| {
                anyhow!(
                    "sample index {} out of range for {} sampled values",
                    index,
                    samples.len()
                )
            })?,
        };

        if let Some(model) = &self.wavelength_model {
            prop += model.evaluate(wavelength);
        }
        if let Some(model) = &self.width_model {
            prop += model.evaluate(width);
        }

        Ok(prop)
    }
}

/// Attaches a wavelength model to a material slot.
///
/// Mirrors the command line merge rule: a wavelength model joins an existing
/// width model on the same property, otherwise it replaces whatever the slot
/// held before.
pub fn apply_wavelength_model(slot: &mut Option<Material>, model: TaylorExpansion) {
    match slot {
        Some(material) if material.width_model.is_some() => {
            material.wavelength_model = Some(model);
        }
        _ => *slot = Some(Material::from_wavelength_model(model)),
    }
}

/// Attaches a width model to a material slot; counterpart of
/// [`apply_wavelength_model`].
pub fn apply_width_model(slot: &mut Option<Material>, model: TaylorExpansion) {
    match slot {
        Some(material) if material.wavelength_model.is_some() => {
            material.width_model = Some(model);
        }
        _ => *slot = Some(Material::from_width_model(model)),
    }
}

/// Declarative material description for the TOML configuration file.
///
/// Unlike the command line, the file form is order-free, so a base and both
/// models may all be given together.
#[derive(Debug, Clone, Deserialize)]
struct MaterialSpec {
    #[serde(default)]
    values: Vec<f64>,
    /// `[l0, a0, a1, ...]`: expansion point then coefficients.
    model: Option<Vec<f64>>,
    /// `[w0, b0, b1, ...]`: expansion point then coefficients.
    width_model: Option<Vec<f64>>,
}

impl TryFrom<MaterialSpec> for Material {
    type Error = anyhow::Error;

    fn try_from(spec: MaterialSpec) -> Result<Self> {
        let mut material = if spec.values.is_empty() {
            Material::default()
        } else {
            Material::from_values(&spec.values)?
        };
        if let Some(model) = spec.model {
            material.wavelength_model = Some(split_model(&model, Reduction::Subtract)?);
        }
        if let Some(model) = spec.width_model {
            material.width_model = Some(split_model(&model, Reduction::Add)?);
        }
        Ok(material)
    }
}

fn split_model(values: &[f64], reduction: Reduction) -> Result<TaylorExpansion> {
    let [x0, coeffs @ ..] = values else {
        bail!("dispersion model requires an expansion point and at least one coefficient");
    };
    TaylorExpansion::new(*x0, coeffs.to_vec(), reduction)
}
