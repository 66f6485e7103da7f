//! Altitude grid of the atmospheric column

use crate::errors::{DiffusionError, DiffusionResult};
use crate::scalar::Scalar;
use log::debug;
use ndarray::{Array1, ArrayView1};

/// Minimum number of levels needed for central differences at one interior point
pub const MIN_LEVELS: usize = 3;

/// Equally spaced, strictly increasing altitudes in km
///
/// Level `i` sits at `z_min + i * z_step`. The last level is the highest one
/// not above `z_max`.
#[derive(Debug, Clone, PartialEq)]
pub struct AltitudeGrid<S: Scalar> {
    min: S,
    max: S,
    step: S,
    altitudes: Array1<S>,
}

impl<S: Scalar> AltitudeGrid<S> {
    pub fn new(min: S, max: S, step: S) -> DiffusionResult<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(DiffusionError::invalid(
                "altitude bounds and step must be finite",
            ));
        }
        if step <= S::zero() {
            return Err(DiffusionError::invalid(format!(
                "altitude step must be positive, got {}",
                step
            )));
        }
        if max <= min {
            return Err(DiffusionError::invalid(format!(
                "altitude max ({}) must be above altitude min ({})",
                max, min
            )));
        }

        // Tolerate rounding in the quotient but never step past `max`
        let quotient = (max - min) / step;
        let intervals = (quotient + quotient * S::epsilon() * S::cast(16.0))
            .floor()
            .to_usize()
            .ok_or_else(|| DiffusionError::invalid("altitude range does not fit the step"))?;
        let levels = intervals + 1;
        if levels < MIN_LEVELS {
            return Err(DiffusionError::invalid(format!(
                "altitude grid needs at least {} levels, got {}",
                MIN_LEVELS, levels
            )));
        }

        let altitudes = Array1::from_shape_fn(levels, |i| min + S::from_count(i) * step);
        debug!(
            "Altitude grid {}..{} km, step {} km, {} levels",
            min, max, step, levels
        );

        Ok(Self {
            min,
            max,
            step,
            altitudes,
        })
    }

    pub fn min(&self) -> S {
        self.min
    }

    pub fn max(&self) -> S {
        self.max
    }

    pub fn step(&self) -> S {
        self.step
    }

    pub fn altitudes(&self) -> ArrayView1<'_, S> {
        self.altitudes.view()
    }

    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    /// Indices where a central difference is defined
    pub fn interior(&self) -> std::ops::Range<usize> {
        1..self.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_grid() {
        let grid = AltitudeGrid::new(600.0_f64, 1400.0, 10.0).unwrap();
        assert_eq!(grid.len(), 81);
        assert_eq!(grid.altitudes()[0], 600.0);
        assert_eq!(grid.altitudes()[80], 1400.0);
        assert_eq!(grid.interior(), 1..80);
    }

    #[test]
    fn test_no_drift_in_single_precision() {
        let grid = AltitudeGrid::new(600.0_f32, 1400.0, 10.0).unwrap();
        assert_eq!(grid.altitudes()[grid.len() - 1], 1400.0);
    }

    #[test]
    fn test_partial_last_step_is_dropped() {
        let grid = AltitudeGrid::new(0.0_f64, 25.0, 10.0).unwrap();
        assert_eq!(grid.altitudes().to_vec(), vec![0.0, 10.0, 20.0]);
        assert!(grid.altitudes().iter().all(|&z| z <= grid.max()));

        let grid = AltitudeGrid::new(0.0_f64, 29.9, 10.0).unwrap();
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_inexact_step_keeps_last_level() {
        let grid = AltitudeGrid::new(0.0_f64, 0.3, 0.1).unwrap();
        assert_eq!(grid.len(), 4);
        let grid = AltitudeGrid::new(600.0_f32, 601.0, 0.1).unwrap();
        assert_eq!(grid.len(), 11);
    }

    #[test]
    fn test_too_few_levels() {
        let err = AltitudeGrid::new(0.0_f64, 10.0, 10.0).unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(AltitudeGrid::new(0.0_f64, 10.0, 0.0).is_err());
        assert!(AltitudeGrid::new(0.0_f64, 10.0, -1.0).is_err());
        assert!(AltitudeGrid::new(10.0_f64, 0.0, 1.0).is_err());
    }
}
