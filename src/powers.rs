//! Integer powers of 2x2 complex matrices.

use nalgebra::{Complex, Matrix2};


/// Computes `T^n` by binary exponentiation, in `O(log n)` multiplications.
///
/// `n == 0` returns the identity matrix regardless of `T`.
pub fn matrix_power(t: &Matrix2<Complex<f64>>, mut n: u64) -> Matrix2<Complex<f64>> {
    let mut result = Matrix2::identity();
    let mut base = *t;

    while n > 0 {
        if n & 1 == 1 {
            result *= base;
        }
        n >>= 1;
        if n > 0 {
            base *= base;
        }
    }

    result
}
