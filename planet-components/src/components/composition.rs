//! Atmospheric Composition
//!
//! Hydrostatic number density of every neutral species on the altitude grid.
//!
//! # What This Component Does
//!
//! 1. Computes the mean molar mass of the mixture from the molar fractions at
//!    the bottom of the column.
//! 2. Spreads the reference total density over the column with the barometric
//!    law, integrating point-mass gravity between $z_{min}$ and $z$:
//!
//!    $$ n_s(z) = f_s \, n_0 \exp\left(-\frac{z - z_{min}}{H(z)}\right), \quad
//!       H(z) = \frac{(R + z)(R + z_{min}) \cdot 10^3 \, N_A k_B T(z)}{G M_p \bar{M}} $$
//!
//! 3. Derives the total density, local molar fractions, per-species scale
//!    heights $H_s = k_B T / (g(z) m_s)$ and the bulk atmosphere scale height.
//!
//! # Units
//!
//! - Densities: cm⁻³
//! - Altitudes: km
//! - Scale heights: m
//! - Molar masses: kg/mol once inside the component

use log::debug;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, Ix1};
use planet_core::altitude::AltitudeGrid;
use planet_core::constants::{PlanetConstants, G_TO_KG, KM_TO_M};
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::species::SpeciesRegistry;
use planet_core::temperature::TemperatureProfile;
use planet_core::Scalar;

const COMPONENT: &str = "composition";

/// Hydrostatic composition of the column
#[derive(Debug, Clone)]
pub struct AtmosphericComposition<S: Scalar> {
    registry: SpeciesRegistry,
    grid: AltitudeGrid<S>,
    temperature: TemperatureProfile<S>,
    constants: PlanetConstants,

    /// Total density at the bottom of the column (cm⁻³)
    reference_density: S,
    /// Molar fractions at the bottom of the column, over the full species list
    molar_fractions: Array1<S>,
    /// Neutral molar masses (kg/mol)
    molar_masses: Array1<S>,
    /// Mean molar mass of the neutral mixture (kg/mol)
    mean_molar_mass: S,
    /// Thermal diffusion factor per neutral species
    thermal_coefficients: Array1<S>,

    /// Shape: [species][altitude]
    density: Array2<S>,
    total_density: Array1<S>,
    /// Local molar fraction. Shape: [species][altitude]
    local_fraction: Array2<S>,
    /// Shape: [species][altitude]
    scale_height: Array2<S>,
    atmosphere_scale_height: Array1<S>,
}

impl<S: Scalar> AtmosphericComposition<S> {
    /// Compute the composition of the column.
    ///
    /// `molar_fractions` covers either the neutral species only or the full
    /// species list, in registry order. Neutral fractions must sum to one.
    pub fn new<D: Data<Elem = S>>(
        registry: &SpeciesRegistry,
        grid: &AltitudeGrid<S>,
        temperature: &TemperatureProfile<S>,
        constants: &PlanetConstants,
        molar_fractions: &ArrayBase<D, Ix1>,
        total_density: S,
    ) -> DiffusionResult<Self> {
        constants.validate()?;
        let n_neutrals = registry.n_neutrals();
        let n_full = registry.full().len();

        if temperature.len() != grid.len() {
            return Err(DiffusionError::invalid(format!(
                "temperature profile has {} levels but the altitude grid has {}",
                temperature.len(),
                grid.len()
            )));
        }
        if !(total_density.is_finite() && total_density > S::zero()) {
            return Err(DiffusionError::invalid(format!(
                "total density must be positive, got {}",
                total_density
            )));
        }

        let molar_fractions = if molar_fractions.len() == n_full {
            molar_fractions.to_owned()
        } else if molar_fractions.len() == n_neutrals {
            let mut extended = Array1::zeros(n_full);
            extended.slice_mut(s![..n_neutrals]).assign(molar_fractions);
            extended
        } else {
            return Err(DiffusionError::invalid(format!(
                "expected {} (neutral) or {} (full) molar fractions, got {}",
                n_neutrals,
                n_full,
                molar_fractions.len()
            )));
        };
        if let Some(index) = molar_fractions
            .iter()
            .position(|&f| !(f.is_finite() && f >= S::zero()))
        {
            return Err(DiffusionError::invalid(format!(
                "molar fraction of '{}' must be non-negative, got {}",
                registry.full().name(index),
                molar_fractions[index]
            )));
        }
        let neutral_sum: S = molar_fractions.slice(s![..n_neutrals]).sum();
        if (neutral_sum - S::one()).abs() > S::epsilon() * S::cast(100.0) {
            return Err(DiffusionError::invalid(format!(
                "neutral molar fractions must sum to 1, got {}",
                neutral_sum
            )));
        }

        let radius = constants.radius::<S>();
        if radius + grid.min() <= S::zero() {
            return Err(DiffusionError::invalid(format!(
                "bottom of the column ({} km) lies at or below the centre of {}",
                grid.min(),
                constants.body.name
            )));
        }

        let molar_masses = Array1::from_shape_fn(n_neutrals, |s| {
            S::cast(registry.neutrals().molar_mass(s)) * S::cast(G_TO_KG)
        });
        let mut mean_molar_mass = S::zero();
        for s in 0..n_neutrals {
            mean_molar_mass =
                mean_molar_mass + molar_fractions[s] * S::cast(registry.neutrals().molar_mass(s));
        }
        mean_molar_mass = mean_molar_mass * S::cast(G_TO_KG);
        if !(mean_molar_mass > S::zero()) {
            return Err(DiffusionError::invalid(format!(
                "mean molar mass must be positive, got {}",
                mean_molar_mass
            )));
        }

        let mut composition = Self {
            registry: registry.clone(),
            grid: grid.clone(),
            temperature: temperature.clone(),
            constants: constants.clone(),
            reference_density: total_density,
            molar_fractions,
            molar_masses,
            mean_molar_mass,
            thermal_coefficients: Array1::zeros(n_neutrals),
            density: Array2::zeros((n_neutrals, grid.len())),
            total_density: Array1::zeros(grid.len()),
            local_fraction: Array2::zeros((n_neutrals, grid.len())),
            scale_height: Array2::zeros((n_neutrals, grid.len())),
            atmosphere_scale_height: Array1::zeros(grid.len()),
        };
        composition.compute()?;

        debug!(
            "Composition of {} neutral species over {} levels, mean molar mass {} kg/mol",
            n_neutrals,
            grid.len(),
            composition.mean_molar_mass
        );
        Ok(composition)
    }

    /// Set the thermal diffusion factor of every neutral species (default 0)
    pub fn with_thermal_coefficients<D: Data<Elem = S>>(
        mut self,
        coefficients: &ArrayBase<D, Ix1>,
    ) -> DiffusionResult<Self> {
        if coefficients.len() != self.n_neutrals() {
            return Err(DiffusionError::invalid(format!(
                "expected {} thermal coefficients, got {}",
                self.n_neutrals(),
                coefficients.len()
            )));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(DiffusionError::invalid("thermal coefficients must be finite"));
        }
        self.thermal_coefficients = coefficients.to_owned();
        Ok(self)
    }

    /// Hydrostatic density at altitude `z` for the whole mixture
    fn barometry(&self, z: S, temperature: S) -> S {
        let c = &self.constants;
        let radius = c.radius::<S>();
        let z_min = self.grid.min();
        self.reference_density
            * (-(z - z_min)
                / ((radius + z) * (radius + z_min) * S::cast(KM_TO_M) * c.avogadro::<S>()
                    * c.boltzmann::<S>()
                    * temperature
                    / (c.gravitational_parameter::<S>() * self.mean_molar_mass)))
                .exp()
    }

    fn compute(&mut self) -> DiffusionResult<()> {
        let n_neutrals = self.n_neutrals();
        for iz in 0..self.grid.len() {
            let z = self.grid.altitudes()[iz];
            let t = self.temperature.neutral()[iz];
            let column = self.barometry(z, t);

            let mut total = S::zero();
            for s in 0..n_neutrals {
                let n = self.molar_fractions[s] * column;
                self.density[[s, iz]] = n;
                total = total + n;
            }
            if !(total.is_finite() && total > S::zero()) {
                return Err(DiffusionError::degenerate(
                    COMPONENT,
                    "total density",
                    "all neutrals",
                    iz,
                ));
            }
            self.total_density[iz] = total;

            for s in 0..n_neutrals {
                self.local_fraction[[s, iz]] = self.density[[s, iz]] / total;
                let h = self.constants.scale_height(t, z, self.molar_masses[s]);
                if !(h.is_finite() && h > S::zero()) {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "scale height",
                        self.registry.neutrals().name(s),
                        iz,
                    ));
                }
                self.scale_height[[s, iz]] = h;
            }

            let h = self.constants.scale_height(t, z, self.mean_molar_mass);
            if !(h.is_finite() && h > S::zero()) {
                return Err(DiffusionError::degenerate(
                    COMPONENT,
                    "atmosphere scale height",
                    "all neutrals",
                    iz,
                ));
            }
            self.atmosphere_scale_height[iz] = h;
        }
        Ok(())
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn grid(&self) -> &AltitudeGrid<S> {
        &self.grid
    }

    pub fn temperature(&self) -> &TemperatureProfile<S> {
        &self.temperature
    }

    pub fn constants(&self) -> &PlanetConstants {
        &self.constants
    }

    pub fn n_neutrals(&self) -> usize {
        self.registry.n_neutrals()
    }

    pub fn species_name(&self, species: usize) -> &str {
        self.registry.neutrals().name(species)
    }

    /// Total density supplied at the bottom of the column (cm⁻³)
    pub fn reference_density(&self) -> S {
        self.reference_density
    }

    /// Molar fractions at the bottom of the column over the neutral species
    pub fn neutral_fractions(&self) -> ArrayView1<'_, S> {
        self.molar_fractions.slice(s![..self.n_neutrals()])
    }

    /// Molar fractions of the ionic species (not part of the normalisation)
    pub fn ion_fractions(&self) -> ArrayView1<'_, S> {
        self.molar_fractions.slice(s![self.n_neutrals()..])
    }

    /// Mean molar mass of the neutral mixture (kg/mol)
    pub fn mean_molar_mass(&self) -> S {
        self.mean_molar_mass
    }

    /// Molar mass of a neutral species (kg/mol)
    pub fn molar_mass(&self, species: usize) -> S {
        self.molar_masses[species]
    }

    pub fn thermal_coefficients(&self) -> ArrayView1<'_, S> {
        self.thermal_coefficients.view()
    }

    /// Number density per species (cm⁻³). Shape: [species][altitude]
    pub fn density(&self) -> ArrayView2<'_, S> {
        self.density.view()
    }

    pub fn total_density(&self) -> ArrayView1<'_, S> {
        self.total_density.view()
    }

    /// Local molar fraction `n_s / n_tot`. Shape: [species][altitude]
    pub fn neutral_molar_fraction(&self) -> ArrayView2<'_, S> {
        self.local_fraction.view()
    }

    /// Scale height per species (m). Shape: [species][altitude]
    pub fn scale_height(&self) -> ArrayView2<'_, S> {
        self.scale_height.view()
    }

    /// Scale height of the mixture (m)
    pub fn atmosphere_scale_height(&self) -> ArrayView1<'_, S> {
        self.atmosphere_scale_height.view()
    }
}
