//! Eddy Diffusion Evaluator
//!
//! Turbulent mixing coefficient, identical for every species, scaled with the
//! inverse square root of the density relative to the bottom of the column:
//!
//! $$ K(z) = K_0 \sqrt{\frac{n_{tot}(z_{min})}{n_{tot}(z)}} $$

use crate::components::composition::AtmosphericComposition;
use log::debug;
use ndarray::{Array1, ArrayView1};
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::Scalar;

const COMPONENT: &str = "eddy diffusion";

#[derive(Debug, Clone)]
pub struct EddyDiffusion<S: Scalar> {
    k0: S,
    k: Array1<S>,
}

impl<S: Scalar> EddyDiffusion<S> {
    /// `k0` is the eddy coefficient at the bottom of the column (m²/s)
    pub fn new(composition: &AtmosphericComposition<S>, k0: S) -> DiffusionResult<Self> {
        if !(k0.is_finite() && k0 >= S::zero()) {
            return Err(DiffusionError::invalid(format!(
                "eddy coefficient K0 must be non-negative, got {}",
                k0
            )));
        }

        let reference = composition.reference_density();
        let mut k = Array1::zeros(composition.grid().len());
        for (iz, (value, &total)) in k
            .iter_mut()
            .zip(composition.total_density().iter())
            .enumerate()
        {
            let scaled = k0 * (reference / total).sqrt();
            if !scaled.is_finite() {
                return Err(DiffusionError::degenerate(
                    COMPONENT,
                    "eddy coefficient",
                    "all neutrals",
                    iz,
                ));
            }
            *value = scaled;
        }
        debug!("Eddy diffusion with K0 = {} m^2/s", k0);

        Ok(Self { k0, k })
    }

    pub fn k0(&self) -> S {
        self.k0
    }

    /// Eddy coefficient per altitude (m²/s)
    pub fn k(&self) -> ArrayView1<'_, S> {
        self.k.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use planet_core::altitude::AltitudeGrid;
    use planet_core::constants::PlanetConstants;
    use planet_core::species::SpeciesRegistry;
    use planet_core::temperature::TemperatureProfile;

    fn composition() -> AtmosphericComposition<f64> {
        let registry = SpeciesRegistry::from_names(&["N2", "CH4"], &[]).unwrap();
        let grid = AltitudeGrid::new(600.0, 1400.0, 10.0).unwrap();
        let t = Array1::from_shape_fn(grid.len(), |i| 140.0 + 0.5 * i as f64);
        let temperature = TemperatureProfile::isothermal_species(&t, &grid).unwrap();
        AtmosphericComposition::new(
            &registry,
            &grid,
            &temperature,
            &PlanetConstants::default(),
            &array![0.96, 0.04],
            1e12,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_value_at_bottom() {
        let eddy = EddyDiffusion::new(&composition(), 430.0).unwrap();
        assert_relative_eq!(eddy.k()[0], 430.0, max_relative = 1e-14);
        assert_eq!(eddy.k0(), 430.0);
    }

    #[test]
    fn test_monotonic_when_density_decreases() {
        let c = composition();
        let eddy = EddyDiffusion::new(&c, 430.0).unwrap();
        assert!(c.total_density().windows(2).into_iter().all(|w| w[1] < w[0]));
        assert!(eddy.k().windows(2).into_iter().all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_inverse_square_root_scaling() {
        let c = composition();
        let eddy = EddyDiffusion::new(&c, 430.0).unwrap();
        let iz = 33;
        assert_relative_eq!(
            eddy.k()[iz],
            430.0 * (1e12 / c.total_density()[iz]).sqrt(),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_negative_k0_is_rejected() {
        assert!(EddyDiffusion::new(&composition(), -1.0).is_err());
        assert!(EddyDiffusion::new(&composition(), f64::INFINITY).is_err());
    }
}
