use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::path::PathBuf;

use crate::material::{self, Material, TaylorExpansion};

/// Vacuum permittivity (F/m).
pub const EPS0: f64 = 8.854188e-12;
/// Vacuum permeability (H/m).
pub const MU0: f64 = 4.0 * PI * 1e-7;

/// Free-space speed of light, derived from the vacuum constants.
pub fn light_speed() -> f64 {
    1.0 / (EPS0 * MU0).sqrt()
}

/// Free-space impedance.
pub fn vacuum_impedance() -> f64 {
    (MU0 / EPS0).sqrt()
}

/// Device type selecting the structure to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Bragg,
}

/// Output stream encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Runtime configuration for a sweep.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub device: Device,
    /// Wavelengths to evaluate. Required, shared index with sampled materials.
    pub wavelengths: Vec<f64>,
    /// Grating periods to sweep.
    pub periods: Vec<f64>,
    /// Duty cycles to sweep, each in [0, 1].
    pub duty_cycles: Vec<f64>,
    /// Period counts to sweep; must be non-negative integers.
    pub n_periods: Vec<f64>,
    /// Widths to sweep in the high-index region. Empty means no width sweep.
    pub width1: Vec<f64>,
    /// Widths to sweep in the low-index region. Empty means no width sweep.
    pub width2: Vec<f64>,
    /// High-index region refractive index.
    pub n1: Option<Material>,
    /// Low-index region refractive index.
    pub n2: Option<Material>,
    /// Propagation loss.
    pub loss: Option<Material>,
    /// Group delay wavelength interval; 0 disables group delay output.
    pub dl: f64,
    pub format: OutputFormat,
    /// Output file path; stdout when absent.
    pub output: Option<PathBuf>,
}

impl Settings {
    /// True if any configured material property has a sampled base.
    pub fn any_sampled(&self) -> bool {
        [&self.n1, &self.n2, &self.loss]
            .iter()
            .any(|m| m.as_ref().is_some_and(Material::is_sampled))
    }
}

/// Loads settings from the optional config file, the environment and the
/// command line, in increasing order of precedence.
pub fn load_config() -> Result<Settings> {
    let args = CliArgs::parse();
    load_with_args(args)
}

fn load_with_args(args: CliArgs) -> Result<Settings> {
    let mut settings: Settings = match &args.config {
        Some(path) => {
            let config = Config::builder()
                .add_source(File::from(path.clone()).required(true))
                .add_source(Environment::with_prefix("tmm"))
                .build()
                .with_context(|| format!("loading configuration {:?}", path))?;
            config
                .try_deserialize()
                .context("deserializing configuration")?
        }
        None => Settings::default(),
    };

    if let Some(device) = args.device {
        settings.device = device;
    }
    if let Some(wavelengths) = args.wavelengths {
        settings.wavelengths = wavelengths;
    }
    if let Some(periods) = args.periods {
        settings.periods = periods;
    }
    if let Some(duty_cycles) = args.duty_cycles {
        settings.duty_cycles = duty_cycles;
    }
    if let Some(n_periods) = args.n_periods {
        settings.n_periods = n_periods;
    }
    if let Some(width1) = args.width1 {
        settings.width1 = width1;
    }
    if let Some(width2) = args.width2 {
        settings.width2 = width2;
    }
    if let Some(values) = args.n1 {
        settings.n1 = Some(Material::from_values(&values)?);
    }
    if let Some(values) = args.n2 {
        settings.n2 = Some(Material::from_values(&values)?);
    }
    if let Some(values) = args.loss {
        settings.loss = Some(Material::from_values(&values)?);
    }
    // Dispersion models replace a plain base but join a sibling model on the
    // same property, so "--n1-model --n1-width-model" composes both.
    if let Some(model) = args.n1_model {
        material::apply_wavelength_model(&mut settings.n1, model);
    }
    if let Some(model) = args.n2_model {
        material::apply_wavelength_model(&mut settings.n2, model);
    }
    if let Some(model) = args.loss_model {
        settings.loss = Some(Material::from_wavelength_model(model));
    }
    if let Some(model) = args.n1_width_model {
        material::apply_width_model(&mut settings.n1, model);
    }
    if let Some(model) = args.n2_width_model {
        material::apply_width_model(&mut settings.n2, model);
    }
    if let Some(dl) = args.dl {
        if dl == 0.0 {
            eprintln!("[WARN] setup: group delay: wavelength interval=0, ignored");
        }
        settings.dl = dl;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(output) = args.output {
        settings.output = Some(output);
    }

    validate(&settings)?;

    if settings.dl != 0.0 && settings.any_sampled() {
        eprintln!("[WARN] setup: group delay: not supported for sampled data, skipped");
    }

    Ok(settings)
}

/// Checks that the sweep is fully specified before it starts.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.wavelengths.is_empty() {
        bail!("must specify at least one wavelength");
    }
    if settings.periods.is_empty() {
        bail!("bragg: must specify at least one period");
    }
    if settings.duty_cycles.is_empty() {
        bail!("bragg: must specify at least one duty cycle");
    }
    if let Some(dc) = settings
        .duty_cycles
        .iter()
        .find(|dc| !(0.0..=1.0).contains(*dc))
    {
        bail!("bragg: duty cycle {} out of bounds, expected 0-1", dc);
    }
    if settings.n_periods.is_empty() {
        bail!("bragg: must specify at least one number of periods");
    }
    if let Some(n) = settings
        .n_periods
        .iter()
        .find(|n| !n.is_finite() || **n < 0.0 || n.fract() != 0.0)
    {
        bail!(
            "bragg: number of periods must be a non-negative integer, got {}",
            n
        );
    }
    if settings.n1.is_none() {
        bail!("bragg: must specify n1 with --n1 or --n1-model");
    }
    if settings.n2.is_none() {
        bail!("bragg: must specify n2 with --n2 or --n2-model");
    }
    if settings.loss.is_none() {
        bail!("bragg: must specify loss with --loss or --loss-model");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "TMM - reflection and transmission spectra of Bragg gratings")]
pub struct CliArgs {
    /// Path to a TOML configuration file. Command line options override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device to simulate.
    #[arg(short, long, value_enum)]
    device: Option<Device>,

    /// Wavelengths to evaluate, comma separated.
    #[arg(short = 'l', long = "wavelength", value_delimiter = ',')]
    wavelengths: Option<Vec<f64>>,

    /// Group delay wavelength interval. 0 disables the group delay column.
    #[arg(long)]
    dl: Option<f64>,

    /// Grating periods, comma separated.
    #[arg(short, long = "period", value_delimiter = ',')]
    periods: Option<Vec<f64>>,

    /// Duty cycles in 0-1, comma separated.
    #[arg(short = 'c', long = "dutycycle", value_delimiter = ',')]
    duty_cycles: Option<Vec<f64>>,

    /// Numbers of grating periods, comma separated.
    #[arg(short = 'N', long = "n-periods", value_delimiter = ',')]
    n_periods: Option<Vec<f64>>,

    /// Refractive index of the high-index region: one value for a constant,
    /// several for one sample per wavelength.
    #[arg(long, value_delimiter = ',')]
    n1: Option<Vec<f64>>,

    /// Refractive index of the low-index region: one value for a constant,
    /// several for one sample per wavelength.
    #[arg(long, value_delimiter = ',')]
    n2: Option<Vec<f64>>,

    /// Loss: one value for a constant, several for one sample per wavelength.
    #[arg(short = 'a', long, value_delimiter = ',')]
    loss: Option<Vec<f64>>,

    /// Wavelength model for n1: l0,a0,a1,... gives n1(l) = a0 - a1*(l-l0) - a2*(l-l0)^2
    #[arg(long = "n1-model", value_parser = parse_wavelength_model)]
    n1_model: Option<TaylorExpansion>,

    /// Wavelength model for n2: l0,a0,a1,... gives n2(l) = a0 - a1*(l-l0) - a2*(l-l0)^2
    #[arg(long = "n2-model", value_parser = parse_wavelength_model)]
    n2_model: Option<TaylorExpansion>,

    /// Wavelength model for loss: l0,a0,a1,... gives loss(l) = a0 - a1*(l-l0) - a2*(l-l0)^2
    #[arg(long = "loss-model", value_parser = parse_wavelength_model)]
    loss_model: Option<TaylorExpansion>,

    /// Widths to sweep in the high-index region, comma separated.
    #[arg(long = "w1", value_delimiter = ',')]
    width1: Option<Vec<f64>>,

    /// Widths to sweep in the low-index region, comma separated.
    #[arg(long = "w2", value_delimiter = ',')]
    width2: Option<Vec<f64>>,

    /// Width model for n1: w0,b0,b1,... gives dn1(w) = b0 + b1*(w-w0) + b2*(w-w0)^2.
    /// When combined with --n1-model, specify b0 as 0.0.
    #[arg(long = "n1-width-model", value_parser = parse_width_model)]
    n1_width_model: Option<TaylorExpansion>,

    /// Width model for n2: w0,b0,b1,... gives dn2(w) = b0 + b1*(w-w0) + b2*(w-w0)^2.
    /// When combined with --n2-model, specify b0 as 0.0.
    #[arg(long = "n2-width-model", value_parser = parse_width_model)]
    n2_width_model: Option<TaylorExpansion>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file. Results go to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Parse a model specification "x0,c0,c1,..." into an expansion point and
/// coefficient list.
fn parse_model_values(s: &str) -> Result<(f64, Vec<f64>), String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("failed to parse '{}' as a number", v))
        })
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [x0, coeffs @ ..] if !coeffs.is_empty() => Ok((*x0, coeffs.to_vec())),
        _ => Err(format!(
            "expected an expansion point and at least one coefficient, got '{}'",
            s
        )),
    }
}

fn parse_wavelength_model(s: &str) -> Result<TaylorExpansion, String> {
    let (x0, coeffs) = parse_model_values(s)?;
    TaylorExpansion::wavelength(x0, coeffs).map_err(|e| e.to_string())
}

fn parse_width_model(s: &str) -> Result<TaylorExpansion, String> {
    let (x0, coeffs) = parse_model_values(s)?;
    TaylorExpansion::width(x0, coeffs).map_err(|e| e.to_string())
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Wavelengths: {:?}
  - Periods: {:?}
  - Duty Cycles: {:?}
  - Period Counts: {:?}
  - Group Delay Interval: {:.6}
  ",
            self.wavelengths, self.periods, self.duty_cycles, self.n_periods, self.dl,
        )
    }
}
