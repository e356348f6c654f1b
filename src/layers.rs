//! Primitive transfer matrices for layered media.
//!
//! This module builds the two 2x2 complex matrices everything else is
//! composed from: propagation through a homogeneous layer and the Fresnel
//! step across a refractive index discontinuity at normal incidence. Both
//! are pure functions over fixed-size `nalgebra` matrices relating forward
//! and backward wave amplitudes on either side of the element.
//!
//! Invalid inputs (zero wavelength, non-positive index product) are not
//! guarded here; they propagate as `inf`/`nan` through the floating point
//! pipeline, which keeps legitimate degenerate structures visible in the
//! output instead of aborting the sweep.

use nalgebra::{Complex, Matrix2, Vector2};
use std::f64::consts::PI;


/// Complex propagation constant `beta = k0*neff - i*loss/2`, where
/// `k0 = 2*pi/wavelength` is the free-space wavenumber.
pub fn beta(neff: f64, wavelength: f64, loss: f64) -> Complex<f64> {
    let k0 = 2.0 * PI / wavelength;
    Complex::new(k0 * neff, -loss / 2.0)
}

/// Transfer matrix for propagation through a homogeneous layer.
///
/// The result is `diag(exp(i*phi), exp(-i*phi))` with `phi = beta*length`:
/// the forward amplitude advances in phase while the backward amplitude
/// retreats, and a positive loss attenuates both.
pub fn homogeneous_layer(
    wavelength: f64,
    length: f64,
    neff: f64,
    loss: f64,
) -> Matrix2<Complex<f64>> {
    let phase = beta(neff, wavelength, loss) * length;
    Matrix2::from_diagonal(&Vector2::new(
        (Complex::<f64>::i() * phase).exp(),
        (-Complex::<f64>::i() * phase).exp(),
    ))
}

/// Transfer matrix for a refractive index step at normal incidence.
///
/// `T = [[a, b], [b, a]]` with `a = (n1+n2)/(2*sqrt(n1*n2))` and
/// `b = (n1-n2)/(2*sqrt(n1*n2))`, the normal-incidence Fresnel
/// coefficients. Both indices are expected strictly positive; a
/// non-positive product yields `nan` entries.
pub fn index_step(n1: f64, n2: f64) -> Matrix2<Complex<f64>> {
    let denom = 2.0 * (n1 * n2).sqrt();
    let a = Complex::new((n1 + n2) / denom, 0.0);
    let b = Complex::new((n1 - n2) / denom, 0.0);
    Matrix2::new(a, b, b, a)
}
