use serde::Serialize;

use crate::settings::Settings;

/// Which optional columns are active for a run.
///
/// Decided once from the settings before the sweep starts and held constant
/// for the whole output stream: width columns appear only when the matching
/// sweep list is non-empty, and the group delay column only when an interval
/// was given and no material property is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub width1: bool,
    pub width2: bool,
    pub group_delay: bool,
}

impl Columns {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            width1: !settings.width1.is_empty(),
            width2: !settings.width2.is_empty(),
            group_delay: settings.dl != 0.0 && !settings.any_sampled(),
        }
    }
}

/// One evaluated sweep point: the swept parameter values plus the resolved
/// material properties and the grating response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub period: f64,
    pub duty_cycle: f64,
    #[serde(rename = "N")]
    pub n_periods: f64,
    pub wavelength: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w2: Option<f64>,
    pub n1: f64,
    pub n2: f64,
    pub loss: f64,
    #[serde(rename = "R")]
    pub reflectance: f64,
    #[serde(rename = "T")]
    pub transmittance: f64,
    pub phase_r: f64,
    pub phase_t: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_delay: Option<f64>,
}
