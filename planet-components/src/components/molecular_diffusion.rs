//! Molecular Diffusion Evaluator
//!
//! Effective multi-component molecular diffusion coefficient of every
//! neutral species, treating all other neutrals as the diffusion medium.
//!
//! # Algorithm
//!
//! At each altitude, with $P = n_{tot} k_B T$:
//!
//! 1. Combine the binary coefficients of species $s$ with every other species:
//!    $$ D_s = \frac{n_{tot} - n_s}{\sum_{m \ne s} n_m / D_{m,s}} $$
//! 2. Average the other species' molar masses weighted by density:
//!    $$ M_{diff} = \frac{1}{N - 1} \sum_{j \ne s} n_j M_j $$
//! 3. Apply the correction
//!    $$ \tilde{D}_s = \frac{D_s}{1 - x_s (1 - M_s / M_{diff})} $$
//!
//! A single neutral species has no medium to diffuse through, so at least
//! two neutral species are required.

use crate::components::binary_diffusion::BinaryDiffusionTable;
use crate::components::composition::AtmosphericComposition;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::Scalar;

const COMPONENT: &str = "molecular diffusion";

#[derive(Debug, Clone)]
pub struct MolecularDiffusion<S: Scalar> {
    /// Pressure per altitude (Pa)
    pressure: Array1<S>,
    /// Combined binary coefficient before correction. Shape: [species][altitude]
    combined: Array2<S>,
    /// Effective coefficient (m²/s). Shape: [species][altitude]
    dtilde: Array2<S>,
}

impl<S: Scalar> MolecularDiffusion<S> {
    pub fn new(
        composition: &AtmosphericComposition<S>,
        table: &BinaryDiffusionTable<S>,
    ) -> DiffusionResult<Self> {
        let n_species = composition.n_neutrals();
        if n_species < 2 {
            return Err(DiffusionError::invalid(format!(
                "molecular diffusion needs at least 2 neutral species, got {}",
                n_species
            )));
        }
        let neutral_names = composition.registry().neutrals().names();
        if table.species() != neutral_names.as_slice() {
            return Err(DiffusionError::invalid(format!(
                "binary diffusion table covers {:?} but the neutral species are {:?}",
                table.species(),
                neutral_names
            )));
        }
        table.validate_for_mixture()?;

        let n_levels = composition.grid().len();
        let mut evaluator = Self {
            pressure: Array1::zeros(n_levels),
            combined: Array2::zeros((n_species, n_levels)),
            dtilde: Array2::zeros((n_species, n_levels)),
        };
        evaluator.compute(composition, table)?;
        debug!(
            "Molecular diffusion for {} species over {} levels",
            n_species, n_levels
        );
        Ok(evaluator)
    }

    fn compute(
        &mut self,
        composition: &AtmosphericComposition<S>,
        table: &BinaryDiffusionTable<S>,
    ) -> DiffusionResult<()> {
        let constants = composition.constants();
        let density = composition.density();
        let fraction = composition.neutral_molar_fraction();
        let n_species = composition.n_neutrals();
        let others = S::from_count(n_species - 1);

        for iz in 0..composition.grid().len() {
            let t = composition.temperature().neutral()[iz];
            let total = composition.total_density()[iz];
            let p = constants.pressure(total, t);
            self.pressure[iz] = p;

            for s in 0..n_species {
                let species = composition.species_name(s);

                let mut denominator = S::zero();
                for medium in (0..n_species).filter(|&m| m != s) {
                    let d = table.coefficient(medium, s, t, p, constants).ok_or_else(|| {
                        DiffusionError::invalid(format!(
                            "missing binary diffusion calibration for ({}, {})",
                            composition.species_name(medium),
                            species
                        ))
                    })?;
                    denominator = denominator + density[[medium, iz]] / d;
                }
                if !(denominator.is_finite() && denominator > S::zero()) {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "binary diffusion denominator",
                        species,
                        iz,
                    ));
                }
                let d_s = (total - density[[s, iz]]) / denominator;
                self.combined[[s, iz]] = d_s;

                let mut m_diff = S::zero();
                for j in (0..n_species).filter(|&j| j != s) {
                    m_diff = m_diff + density[[j, iz]] * composition.molar_mass(j);
                }
                m_diff = m_diff / others;
                if !(m_diff.is_finite() && m_diff > S::zero()) {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "diffusion medium molar mass",
                        species,
                        iz,
                    ));
                }

                let correction =
                    S::one() - fraction[[s, iz]] * (S::one() - composition.molar_mass(s) / m_diff);
                let dtilde = d_s / correction;
                if correction == S::zero() || !dtilde.is_finite() {
                    return Err(DiffusionError::degenerate(
                        COMPONENT,
                        "thermal correction",
                        species,
                        iz,
                    ));
                }
                self.dtilde[[s, iz]] = dtilde;
            }
        }
        Ok(())
    }

    /// Effective diffusion coefficient (m²/s). Shape: [species][altitude]
    pub fn dtilde(&self) -> ArrayView2<'_, S> {
        self.dtilde.view()
    }

    /// Combined binary coefficient before the molar mass correction (m²/s)
    pub fn combined(&self) -> ArrayView2<'_, S> {
        self.combined.view()
    }

    /// Pressure used to evaluate the binary coefficients (Pa)
    pub fn pressure(&self) -> ArrayView1<'_, S> {
        self.pressure.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::binary_diffusion::{BinaryDiffusion, Correlation};
    use approx::assert_relative_eq;
    use ndarray::array;
    use planet_core::altitude::AltitudeGrid;
    use planet_core::constants::PlanetConstants;
    use planet_core::species::SpeciesRegistry;
    use planet_core::temperature::TemperatureProfile;

    fn composition(neutrals: &[&str], fractions: Array1<f64>) -> AtmosphericComposition<f64> {
        let registry = SpeciesRegistry::from_names(neutrals, &[]).unwrap();
        let grid = AltitudeGrid::new(600.0, 700.0, 10.0).unwrap();
        let t = Array1::from_shape_fn(grid.len(), |i| 160.0 - i as f64);
        let temperature = TemperatureProfile::isothermal_species(&t, &grid).unwrap();
        AtmosphericComposition::new(
            &registry,
            &grid,
            &temperature,
            &PlanetConstants::default(),
            &fractions,
            1e12,
        )
        .unwrap()
    }

    fn n2_ch4_table(c: &AtmosphericComposition<f64>) -> BinaryDiffusionTable<f64> {
        BinaryDiffusionTable::from_pairs(
            c.registry().neutrals(),
            [BinaryDiffusion::new(
                "N2",
                "CH4",
                1.04e-9,
                1.76,
                Correlation::Wakeham,
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_two_species_closed_form() {
        let c = composition(&["N2", "CH4"], array![0.96, 0.04]);
        let table = n2_ch4_table(&c);
        let md = MolecularDiffusion::new(&c, &table).unwrap();
        let constants = PlanetConstants::default();

        let iz = 4;
        let t = c.temperature().neutral()[iz];
        let n = c.density();
        let total = c.total_density()[iz];
        let p = total * 1e6 * constants.physical.boltzmann * t;
        let d = 1.04e-9 * t.powf(1.76) * 101325.0 / p;
        assert_relative_eq!(md.pressure()[iz], p, max_relative = 1e-14);

        // N2 diffuses in CH4 only: D_s = (n_tot - n_N2) / (n_CH4 / D) = D
        assert_relative_eq!(md.combined()[[0, iz]], d, max_relative = 1e-12);

        let m_diff = n[[1, iz]] * 16.043e-3;
        let x = n[[0, iz]] / total;
        let expected = d / (1.0 - x * (1.0 - 28.016e-3 / m_diff));
        assert_relative_eq!(md.dtilde()[[0, iz]], expected, max_relative = 1e-12);
    }

    #[test]
    fn test_three_species_harmonic_combination() {
        let c = composition(&["N2", "CH4", "H2"], array![0.9, 0.07, 0.03]);
        let table = BinaryDiffusionTable::from_pairs(
            c.registry().neutrals(),
            [
                BinaryDiffusion::new("N2", "CH4", 1.04e-9, 1.76, Correlation::Wakeham),
                BinaryDiffusion::new("N2", "H2", 1.88e-4, 1.73, Correlation::Massman),
                BinaryDiffusion::new("CH4", "H2", 2.3e17, 0.765, Correlation::Wilson),
            ],
        )
        .unwrap();
        let md = MolecularDiffusion::new(&c, &table).unwrap();
        let constants = PlanetConstants::default();

        let iz = 7;
        let t = c.temperature().neutral()[iz];
        let p = md.pressure()[iz];
        let n = c.density();
        let d = |i: usize, j: usize| table.coefficient(i, j, t, p, &constants).unwrap();
        let expected = (c.total_density()[iz] - n[[2, iz]])
            / (n[[0, iz]] / d(0, 2) + n[[1, iz]] / d(1, 2));
        assert_relative_eq!(md.combined()[[2, iz]], expected, max_relative = 1e-12);
        assert!(md.dtilde().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_single_species_is_rejected() {
        let c = composition(&["N2"], array![1.0]);
        let table = BinaryDiffusionTable::new(c.registry().neutrals());
        let err = MolecularDiffusion::new(&c, &table).unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_missing_pair_is_rejected() {
        let c = composition(&["N2", "CH4"], array![0.96, 0.04]);
        let table = BinaryDiffusionTable::new(c.registry().neutrals());
        let err = MolecularDiffusion::new(&c, &table).unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_table_for_other_species_is_rejected() {
        let c = composition(&["N2", "CH4"], array![0.96, 0.04]);
        let other = SpeciesRegistry::from_names(&["CH4", "N2"], &[]).unwrap();
        let table = BinaryDiffusionTable::from_pairs(
            other.neutrals(),
            [BinaryDiffusion::new("N2", "CH4", 1.0, 1.0, Correlation::Massman)],
        )
        .unwrap();
        assert!(MolecularDiffusion::new(&c, &table).is_err());
    }

    #[test]
    fn test_absent_medium_is_degenerate() {
        let c = composition(&["N2", "CH4"], array![1.0, 0.0]);
        let table = n2_ch4_table(&c);
        match MolecularDiffusion::new(&c, &table) {
            Err(DiffusionError::NumericDegeneracy {
                species,
                altitude_index,
                ..
            }) => {
                assert_eq!(species, "N2");
                assert_eq!(altitude_index, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
