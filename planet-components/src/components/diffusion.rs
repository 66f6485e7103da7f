//! Diffusion Evaluator
//!
//! Net diffusive transport term $\omega_s$ of every neutral species, combining
//! molecular and eddy diffusion with the vertical gradients of density and
//! temperature.
//!
//! # Algorithm
//!
//! Gradients are central differences, so $\omega$ exists only at interior
//! levels $1 \le i \le n - 2$:
//!
//! $$ \frac{dn_s}{dz} \approx \frac{n_s(i+1) - n_s(i-1)}{z(i+1) - z(i-1)}, \quad
//!    \frac{dT}{dz} \approx \frac{T(i+1) - T(i-1)}{z(i+1) - z(i-1)} $$
//!
//! $$ \omega_s = -\tilde{D}_s \left[\frac{1}{n_s}\frac{dn_s}{dz} + \frac{1}{H_s}
//!    + \frac{1}{T}\frac{dT}{dz}\left(1 + (1 - x_s)\alpha_s\right)\right]
//!    - K \left[\frac{1}{n_s}\frac{dn_s}{dz} + \frac{1}{H_{atm}} + \frac{1}{T}\frac{dT}{dz}\right] $$
//!
//! where $\alpha_s$ is the thermal diffusion factor of the species.
//! Gradients are taken over altitude differences as the grid stores them (km),
//! while scale heights are in metres.

use crate::components::composition::AtmosphericComposition;
use crate::components::eddy_diffusion::EddyDiffusion;
use crate::components::molecular_diffusion::MolecularDiffusion;
use log::debug;
use ndarray::{Array2, ArrayView2};
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::Scalar;
use std::ops::Range;

const COMPONENT: &str = "diffusion";

#[derive(Debug, Clone)]
pub struct Diffusion<S: Scalar> {
    /// Shape: [species][interior altitude]; column `i` is altitude index `i + 1`
    omega: Array2<S>,
    n_levels: usize,
}

impl<S: Scalar> Diffusion<S> {
    pub fn new(
        composition: &AtmosphericComposition<S>,
        molecular: &MolecularDiffusion<S>,
        eddy: &EddyDiffusion<S>,
    ) -> DiffusionResult<Self> {
        let n_species = composition.n_neutrals();
        let n_levels = composition.grid().len();
        if n_levels < 3 {
            return Err(DiffusionError::invalid(format!(
                "diffusion needs at least 3 altitude levels, got {}",
                n_levels
            )));
        }
        if molecular.dtilde().dim() != (n_species, n_levels) || eddy.k().len() != n_levels {
            return Err(DiffusionError::invalid(
                "molecular and eddy diffusion were not evaluated on this composition",
            ));
        }

        let mut diffusion = Self {
            omega: Array2::zeros((n_species, n_levels - 2)),
            n_levels,
        };
        diffusion.compute(composition, molecular, eddy)?;
        debug!(
            "Diffusion terms for {} species over {} interior levels",
            n_species,
            n_levels - 2
        );
        Ok(diffusion)
    }

    fn compute(
        &mut self,
        composition: &AtmosphericComposition<S>,
        molecular: &MolecularDiffusion<S>,
        eddy: &EddyDiffusion<S>,
    ) -> DiffusionResult<()> {
        let altitude = composition.grid().altitudes();
        let temperature = composition.temperature().neutral();
        let density = composition.density();
        let fraction = composition.neutral_molar_fraction();
        let scale_height = composition.scale_height();
        let atmosphere_scale_height = composition.atmosphere_scale_height();
        let thermal = composition.thermal_coefficients();
        let dtilde = molecular.dtilde();
        let k = eddy.k();
        let one = S::one();

        for iz in composition.grid().interior() {
            let dz = altitude[iz + 1] - altitude[iz - 1];
            let t = temperature[iz];
            let dt_dz = (temperature[iz + 1] - temperature[iz - 1]) / dz;
            let h_atm = atmosphere_scale_height[iz];

            for s in 0..composition.n_neutrals() {
                let species = composition.species_name(s);
                let n = density[[s, iz]];
                let h = scale_height[[s, iz]];
                if n == S::zero() {
                    return Err(DiffusionError::degenerate(COMPONENT, "density", species, iz));
                }
                if h == S::zero() || h_atm == S::zero() {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "scale height",
                        species,
                        iz,
                    ));
                }

                let dn_dz = (density[[s, iz + 1]] - density[[s, iz - 1]]) / dz;
                let omega = -dtilde[[s, iz]]
                    * (one / n * dn_dz
                        + one / h
                        + one / t * dt_dz * (one + (one - fraction[[s, iz]]) * thermal[s]))
                    - k[iz] * (one / n * dn_dz + one / h_atm + one / t * dt_dz);
                if !omega.is_finite() {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "diffusion term",
                        species,
                        iz,
                    ));
                }
                self.omega[[s, iz - 1]] = omega;
            }
        }
        Ok(())
    }

    /// Altitude indices at which the diffusion term is defined
    pub fn interior(&self) -> Range<usize> {
        1..self.n_levels - 1
    }

    /// Diffusion terms at interior levels (s⁻¹).
    ///
    /// Shape: [species][interior altitude]; column `i` belongs to altitude index `i + 1`.
    pub fn omega(&self) -> ArrayView2<'_, S> {
        self.omega.view()
    }

    /// Diffusion term of a species at an altitude index.
    ///
    /// `None` at the first and last levels, where no central difference exists.
    pub fn omega_at(&self, species: usize, altitude_index: usize) -> Option<S> {
        if !self.interior().contains(&altitude_index) {
            return None;
        }
        self.omega.get([species, altitude_index - 1]).copied()
    }
}
