//! Group delay from a finite difference of the transmission phase.

use nalgebra::Complex;

use crate::settings::light_speed;

/// Estimates the group delay of the transmitted wave from two scattering
/// evaluations at closely spaced wavelengths.
///
/// The phase derivative is a centered finite difference of the transmission
/// phases, converted through `tau = -(lambda^2 / (2*pi*c)) * dphi/dlambda`
/// with `lambda` the midpoint of the backward/forward pair.
///
/// Only meaningful when the material models resolve at the shifted
/// wavelengths, i.e. not for sampled properties; the orchestrator skips the
/// computation in that case.
pub fn group_delay(
    t_backward: Complex<f64>,
    t_forward: Complex<f64>,
    wavelength_backward: f64,
    wavelength_forward: f64,
) -> f64 {
    let dphi = t_forward.arg() - t_backward.arg();
    let dlambda = wavelength_forward - wavelength_backward;
    let wavelength = 0.5 * (wavelength_backward + wavelength_forward);

    -(wavelength * wavelength) / (2.0 * std::f64::consts::PI * light_speed()) * (dphi / dlambda)
}
