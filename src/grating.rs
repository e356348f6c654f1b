//! Bragg grating response via the transfer matrix method.
//!
//! A grating period is two homogeneous sections separated by index steps.
//! Its transfer matrix is the ordered product of four primitives from
//! [`crate::layers`]; raising that matrix to the period count with
//! [`crate::powers::matrix_power`] gives the scattering matrix of the whole
//! structure, from which the complex reflection and transmission amplitudes
//! follow.

use anyhow::{bail, Result};
use nalgebra::{Complex, Matrix2};

use crate::layers::{homogeneous_layer, index_step};
use crate::powers::matrix_power;

/// Geometry of a uniform Bragg grating.
///
/// The period count is validated to a non-negative integer at construction;
/// sweep lists carry it as a real number, but a fractional count has no
/// meaning for the matrix exponentiation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bragg {
    pub period: f64,
    pub duty_cycle: f64,
    pub num_periods: u64,
}

impl Bragg {
    pub fn new(period: f64, duty_cycle: f64, num_periods: f64) -> Result<Self> {
        if !num_periods.is_finite() || num_periods < 0.0 || num_periods.fract() != 0.0 {
            bail!(
                "number of periods must be a non-negative integer, got {}",
                num_periods
            );
        }
        Ok(Self {
            period,
            duty_cycle,
            num_periods: num_periods as u64,
        })
    }

    /// Transfer matrix of a single grating period.
    ///
    /// Composed left to right as propagate through the high-index section,
    /// cross into the low-index section, propagate, cross back:
    /// `Tp = T11 * T12 * T22 * T21`. The order encodes the physical
    /// traversal and must not be rearranged.
    pub fn transfer_matrix(
        &self,
        wavelength: f64,
        n1: f64,
        n2: f64,
        loss: f64,
    ) -> Matrix2<Complex<f64>> {
        let l1 = self.period * self.duty_cycle;
        let l2 = self.period * (1.0 - self.duty_cycle);

        let t11 = homogeneous_layer(wavelength, l1, n1, loss);
        let t12 = index_step(n1, n2);
        let t22 = homogeneous_layer(wavelength, l2, n2, loss);
        let t21 = index_step(n2, n1);

        t11 * t12 * t22 * t21
    }

    /// Scattering matrix of the full grating: the period matrix raised to
    /// the period count.
    pub fn scattering_matrix(
        &self,
        wavelength: f64,
        n1: f64,
        n2: f64,
        loss: f64,
    ) -> Matrix2<Complex<f64>> {
        let tp = self.transfer_matrix(wavelength, n1, n2, loss);
        matrix_power(&tp, self.num_periods)
    }

    /// Complex reflection and transmission amplitudes at one wavelength.
    pub fn scattering_coefficients(
        &self,
        wavelength: f64,
        n1: f64,
        n2: f64,
        loss: f64,
    ) -> ScatteringCoefficients {
        let s = self.scattering_matrix(wavelength, n1, n2, loss);
        ScatteringCoefficients::from_matrix(&s)
    }
}

/// Complex reflection and transmission amplitudes extracted from a
/// scattering matrix.
///
/// `r = S10/S00` and `t = 1/S00`; the power coefficients and phases derive
/// from these. A singular `S00` is a legitimate physical edge case (total
/// reflection) and yields `inf` values rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringCoefficients {
    pub r: Complex<f64>,
    pub t: Complex<f64>,
}

impl ScatteringCoefficients {
    pub fn from_matrix(s: &Matrix2<Complex<f64>>) -> Self {
        let s00 = s[(0, 0)];
        let s10 = s[(1, 0)];
        Self {
            r: s10 / s00,
            t: Complex::new(1.0, 0.0) / s00,
        }
    }

    /// Reflected power coefficient `R = |r|^2`.
    pub fn reflectance(&self) -> f64 {
        self.r.norm_sqr()
    }

    /// Transmitted power coefficient `T = |t|^2`.
    pub fn transmittance(&self) -> f64 {
        self.t.norm_sqr()
    }

    /// Phase of the reflected amplitude.
    pub fn reflection_phase(&self) -> f64 {
        self.r.arg()
    }

    /// Phase of the transmitted amplitude.
    pub fn transmission_phase(&self) -> f64 {
        self.t.arg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fractional_or_negative_period_counts() {
        assert!(Bragg::new(1.0, 0.5, 10.5).is_err());
        assert!(Bragg::new(1.0, 0.5, -1.0).is_err());
        assert!(Bragg::new(1.0, 0.5, f64::NAN).is_err());
        assert!(Bragg::new(1.0, 0.5, 0.0).is_ok());
    }

    #[test]
    fn zero_periods_transmit_everything() {
        let grating = Bragg::new(1.0, 0.5, 0.0).unwrap();
        let coeffs = grating.scattering_coefficients(1.0, 2.0, 1.5, 0.0);
        assert!((coeffs.transmittance() - 1.0).abs() < 1e-12);
        assert!(coeffs.reflectance() < 1e-12);
    }

    #[test]
    fn lossless_grating_conserves_energy() {
        let grating = Bragg::new(0.3875, 0.5, 25.0).unwrap();
        for i in 0..40 {
            let wavelength = 1.4 + 0.01 * i as f64;
            let coeffs = grating.scattering_coefficients(wavelength, 2.0, 1.5, 0.0);
            let r = coeffs.reflectance();
            let t = coeffs.transmittance();
            assert!(r >= 0.0 && t >= 0.0);
            assert!((r + t - 1.0).abs() < 1e-9, "R+T: {}", r + t);
        }
    }

    #[test]
    fn loss_breaks_energy_conservation_downward() {
        let grating = Bragg::new(0.3875, 0.5, 25.0).unwrap();
        let coeffs = grating.scattering_coefficients(1.55, 2.0, 1.5, 0.5);
        assert!(coeffs.reflectance() + coeffs.transmittance() < 1.0);
    }

    #[test]
    fn quarter_wave_stack_is_highly_reflective() {
        // Quarter-wave sections at 1.55: l1 = lambda/(4*n1), l2 = lambda/(4*n2).
        let (n1, n2) = (3.0, 1.5);
        let l1 = 1.55 / (4.0 * n1);
        let l2 = 1.55 / (4.0 * n2);
        let period = l1 + l2;
        let grating = Bragg::new(period, l1 / period, 20.0).unwrap();
        let coeffs = grating.scattering_coefficients(1.55, n1, n2, 0.0);
        assert!(coeffs.reflectance() > 0.99, "R: {}", coeffs.reflectance());
    }
}
