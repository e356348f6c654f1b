//! Sweep orchestration across the cartesian parameter space.
//!
//! The sweep walks period, duty cycle, period count, width1, width2 and
//! wavelength in that order, evaluates the material models and the grating
//! response at each point, and collects one result row per point. Points
//! are independent, so evaluation runs in parallel with rayon while rows
//! are reassembled in the canonical loop order before emission.

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::iproduct;
use rayon::prelude::*;

use crate::delay;
use crate::grating::Bragg;
use crate::material::Material;
use crate::output;
use crate::result::{Columns, SweepPoint};
use crate::settings::{OutputFormat, Settings};

/// One point of the flattened sweep, before evaluation.
#[derive(Debug, Clone, Copy)]
struct Case {
    grating: Bragg,
    n_periods: f64,
    w1: Option<f64>,
    w2: Option<f64>,
    wavelength: f64,
    /// Wavelength position in the sweep list, shared with sampled materials.
    index: usize,
}

/// Orchestrates a full parameter sweep and owns its results.
///
/// **Context**: A single grating evaluation is cheap, but design studies
/// sweep thousands of combinations of geometry, material and wavelength.
/// The orchestrator owns the iteration order, the per-run column contract
/// and the optional group delay refinement so the numeric modules stay
/// free of sweep concerns.
///
/// **How it Works**: [`Sweep::solve`] expands the cartesian product into a
/// flat case list (constructing and validating each grating geometry on the
/// way), evaluates the cases in parallel, and stores rows in canonical
/// order. [`Sweep::writeup`] then emits them in the configured format.
#[derive(Debug)]
pub struct Sweep {
    pub settings: Settings,
    pub columns: Columns,
    pub result: Vec<SweepPoint>,
}

impl Sweep {
    pub fn new(settings: Settings) -> Self {
        let columns = Columns::from_settings(&settings);
        Self {
            settings,
            columns,
            result: Vec::new(),
        }
    }

    /// Runs the sweep, filling `self.result` with one row per point.
    pub fn solve(&mut self) -> Result<()> {
        let cases = self.expand_cases()?;

        let pb = ProgressBar::new(cases.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg}",
            )
            .unwrap()
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("sweep point".to_string());

        self.result = cases
            .par_iter()
            .map(|case| {
                let row = self.evaluate(case);
                pb.inc(1);
                row
            })
            .collect::<Result<Vec<_>>>()?;

        pb.finish_and_clear();
        Ok(())
    }

    /// Flattens the sweep space into an ordered case list.
    ///
    /// An empty width list collapses to a single sentinel point so the loop
    /// structure is uniform whether or not widths are swept.
    fn expand_cases(&self) -> Result<Vec<Case>> {
        let s = &self.settings;
        let w1_list: Vec<Option<f64>> = width_sweep(&s.width1);
        let w2_list: Vec<Option<f64>> = width_sweep(&s.width2);

        let mut cases = Vec::new();
        for (&period, &duty_cycle, &n) in iproduct!(&s.periods, &s.duty_cycles, &s.n_periods) {
            let grating = Bragg::new(period, duty_cycle, n)?;
            for (&w1, &w2) in iproduct!(&w1_list, &w2_list) {
                for (index, &wavelength) in s.wavelengths.iter().enumerate() {
                    cases.push(Case {
                        grating,
                        n_periods: n,
                        w1,
                        w2,
                        wavelength,
                        index,
                    });
                }
            }
        }
        Ok(cases)
    }

    fn evaluate(&self, case: &Case) -> Result<SweepPoint> {
        let n1_model = self.material(&self.settings.n1, "n1")?;
        let n2_model = self.material(&self.settings.n2, "n2")?;
        let loss_model = self.material(&self.settings.loss, "loss")?;

        // Unswept widths resolve to the 0.0 sentinel for model evaluation.
        let w1 = case.w1.unwrap_or(0.0);
        let w2 = case.w2.unwrap_or(0.0);

        let n1 = n1_model.evaluate(case.wavelength, w1, case.index)?;
        let n2 = n2_model.evaluate(case.wavelength, w2, case.index)?;
        let loss = loss_model.evaluate(case.wavelength, 0.0, case.index)?;

        let coeffs = case
            .grating
            .scattering_coefficients(case.wavelength, n1, n2, loss);

        let group_delay = if self.columns.group_delay {
            let dl = self.settings.dl;
            let wb = case.wavelength - dl;
            let wf = case.wavelength + dl;
            // Loss is held at its center-wavelength value for both offset
            // evaluations.
            let back = case.grating.scattering_coefficients(
                wb,
                n1_model.evaluate(wb, w1, case.index)?,
                n2_model.evaluate(wb, w2, case.index)?,
                loss,
            );
            let fwd = case.grating.scattering_coefficients(
                wf,
                n1_model.evaluate(wf, w1, case.index)?,
                n2_model.evaluate(wf, w2, case.index)?,
                loss,
            );
            Some(delay::group_delay(back.t, fwd.t, wb, wf))
        } else {
            None
        };

        Ok(SweepPoint {
            period: case.grating.period,
            duty_cycle: case.grating.duty_cycle,
            n_periods: case.n_periods,
            wavelength: case.wavelength,
            w1: case.w1,
            w2: case.w2,
            n1,
            n2,
            loss,
            reflectance: coeffs.reflectance(),
            transmittance: coeffs.transmittance(),
            phase_r: coeffs.reflection_phase(),
            phase_t: coeffs.transmission_phase(),
            group_delay,
        })
    }

    fn material<'a>(&self, slot: &'a Option<Material>, name: &str) -> Result<&'a Material> {
        slot.as_ref()
            .ok_or_else(|| anyhow!("material property {} is not configured", name))
    }

    /// Emits the collected rows in the configured format and sink.
    pub fn writeup(&self) -> Result<()> {
        let columns = self.columns;
        output::with_sink(self.settings.output.as_deref(), |writer| {
            match self.settings.format {
                OutputFormat::Csv => output::write_csv(writer, &self.result, columns),
                OutputFormat::Json => output::write_json(writer, &self.result),
            }
        })
    }
}

fn width_sweep(widths: &[f64]) -> Vec<Option<f64>> {
    if widths.is_empty() {
        vec![None]
    } else {
        widths.iter().copied().map(Some).collect()
    }
}
