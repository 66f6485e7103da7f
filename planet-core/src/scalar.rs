//! Floating point abstraction shared by every evaluator.
//!
//! All profiles are generic over [`Scalar`] so that the same formulas can be
//! evaluated in single or double precision. Physical constants are stored as
//! `f64` and narrowed with [`Scalar::cast`] at the point of use.

use ndarray::ScalarOperand;
use num::Float;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Floating point type usable in a diffusion evaluation.
pub trait Scalar:
    Float + ScalarOperand + Sum + Default + Debug + Display + Send + Sync + 'static
{
    /// Convert an `f64` literal or constant into this precision.
    fn cast(value: f64) -> Self;

    /// Convert a count into this precision.
    fn from_count(count: usize) -> Self {
        Self::cast(count as f64)
    }

    /// Relative tolerance used to compare evaluations against closed forms.
    ///
    /// Scales with the machine epsilon of the type.
    fn acceptance_tolerance() -> Self {
        Self::epsilon() * Self::cast(6000.0)
    }
}

impl Scalar for f32 {
    fn cast(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for f64 {
    fn cast(value: f64) -> Self {
        value
    }
}

/// Relative difference `|(expected - actual) / expected|`.
///
/// Falls back to the absolute difference when `expected` is zero.
pub fn relative_difference<S: Scalar>(expected: S, actual: S) -> S {
    if expected == S::zero() {
        (expected - actual).abs()
    } else {
        ((expected - actual) / expected).abs()
    }
}
