//! Binary diffusion coefficients
//!
//! Each pair of neutral species diffuses through the other following an
//! empirical power law in temperature and pressure. The law is calibrated
//! per pair with two constants whose meaning depends on the correlation the
//! calibration was published for (see [`Correlation`]). Every correlation
//! reduces to the common form
//!
//! $$ D(T, P) = D_0 \frac{P_0}{P} \left(\frac{T}{T_0}\right)^{s} $$
//!
//! with $P_0$ the normal pressure and $T_0$ the standard temperature.

use log::warn;
use planet_core::constants::PlanetConstants;
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::species::SpeciesList;
use planet_core::Scalar;
use serde::{Deserialize, Serialize};

/// Published form of a binary diffusion calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correlation {
    /// $D = c_1 (P_0/P) (T/T_0)^{c_2}$
    Massman,
    /// $D = c_1 T^{c_2} / n$, i.e. $c_1 k_B T^{c_2 + 1} / P$
    Wilson,
    /// $D = c_1 T^{c_2} P_0 / P$
    Wakeham,
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Correlation::Massman => write!(f, "Massman"),
            Correlation::Wilson => write!(f, "Wilson"),
            Correlation::Wakeham => write!(f, "Wakeham"),
        }
    }
}

/// Common power law: `reference · (P_normal / P) · (T / T_standard)^exponent`
pub fn power_law<S: Scalar>(
    temperature: S,
    pressure: S,
    reference: S,
    exponent: S,
    constants: &PlanetConstants,
) -> S {
    reference * constants.normal_pressure::<S>() / pressure
        * (temperature / constants.standard_temperature::<S>()).powf(exponent)
}

/// Scale a self-diffusion coefficient `D_ii` to the pair `(i, j)` by molar mass.
///
/// Lighter partners use `sqrt((Mj/Mi + 1)/2)`, heavier or equal ones `sqrt(Mj/Mi)`.
pub fn mass_scaled<S: Scalar>(self_diffusion: S, molar_mass_i: S, molar_mass_j: S) -> S {
    if molar_mass_j < molar_mass_i {
        self_diffusion * ((molar_mass_j / molar_mass_i + S::one()) / S::cast(2.0)).sqrt()
    } else {
        self_diffusion * (molar_mass_j / molar_mass_i).sqrt()
    }
}

/// Calibrated binary diffusion law of a species pair
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDiffusion<S: Scalar> {
    first: String,
    second: String,
    coefficient_1: S,
    coefficient_2: S,
    correlation: Correlation,
}

impl<S: Scalar> BinaryDiffusion<S> {
    pub fn new(
        first: &str,
        second: &str,
        coefficient_1: S,
        coefficient_2: S,
        correlation: Correlation,
    ) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            coefficient_1,
            coefficient_2,
            correlation,
        }
    }

    pub fn species(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn correlation(&self) -> Correlation {
        self.correlation
    }

    pub fn coefficients(&self) -> (S, S) {
        (self.coefficient_1, self.coefficient_2)
    }

    /// Coefficient at the normal pressure and standard temperature
    pub fn reference_coefficient(&self, constants: &PlanetConstants) -> S {
        let t0 = constants.standard_temperature::<S>();
        match self.correlation {
            Correlation::Massman => self.coefficient_1,
            Correlation::Wilson => {
                self.coefficient_1 * t0.powf(self.coefficient_2 + S::one())
                    * constants.boltzmann::<S>()
                    / constants.normal_pressure::<S>()
            }
            Correlation::Wakeham => self.coefficient_1 * t0.powf(self.coefficient_2),
        }
    }

    /// Temperature exponent of the common power law
    pub fn exponent(&self) -> S {
        match self.correlation {
            Correlation::Massman | Correlation::Wakeham => self.coefficient_2,
            Correlation::Wilson => self.coefficient_2 + S::one(),
        }
    }

    /// Binary diffusion coefficient in m²/s at temperature (K) and pressure (Pa)
    pub fn coefficient(&self, temperature: S, pressure: S, constants: &PlanetConstants) -> S {
        power_law(
            temperature,
            pressure,
            self.reference_coefficient(constants),
            self.exponent(),
            constants,
        )
    }
}

/// How the coefficient of one table entry is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum PairLaw<S: Scalar> {
    Calibrated(BinaryDiffusion<S>),
    /// Derived from the self-diffusion law of species `i` with [`mass_scaled`]
    MassScaled {
        self_diffusion: BinaryDiffusion<S>,
        molar_mass_i: S,
        molar_mass_j: S,
    },
}

impl<S: Scalar> PairLaw<S> {
    pub fn coefficient(&self, temperature: S, pressure: S, constants: &PlanetConstants) -> S {
        match self {
            PairLaw::Calibrated(law) => law.coefficient(temperature, pressure, constants),
            PairLaw::MassScaled {
                self_diffusion,
                molar_mass_i,
                molar_mass_j,
            } => mass_scaled(
                self_diffusion.coefficient(temperature, pressure, constants),
                *molar_mass_i,
                *molar_mass_j,
            ),
        }
    }
}

/// Symmetric table of binary diffusion laws indexed by neutral species position
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDiffusionTable<S: Scalar> {
    species: Vec<String>,
    entries: Vec<Option<PairLaw<S>>>,
}

impl<S: Scalar> BinaryDiffusionTable<S> {
    pub fn new(neutrals: &SpeciesList) -> Self {
        let n = neutrals.len();
        Self {
            species: neutrals.names().into_iter().map(String::from).collect(),
            entries: vec![None; n * n],
        }
    }

    pub fn from_pairs(
        neutrals: &SpeciesList,
        pairs: impl IntoIterator<Item = BinaryDiffusion<S>>,
    ) -> DiffusionResult<Self> {
        let mut table = Self::new(neutrals);
        for pair in pairs {
            table.insert(pair)?;
        }
        Ok(table)
    }

    fn index(&self, name: &str) -> DiffusionResult<usize> {
        self.species.iter().position(|s| s == name).ok_or_else(|| {
            DiffusionError::invalid(format!(
                "binary diffusion given for '{}', which is not a neutral species",
                name
            ))
        })
    }

    fn slot(&self, i: usize, j: usize) -> usize {
        i * self.species.len() + j
    }

    /// Store a calibrated pair in both `(i, j)` and `(j, i)`
    pub fn insert(&mut self, pair: BinaryDiffusion<S>) -> DiffusionResult<()> {
        let i = self.index(&pair.first)?;
        let j = self.index(&pair.second)?;
        if self.entries[self.slot(i, j)].is_some() {
            return Err(DiffusionError::invalid(format!(
                "binary diffusion of ({}, {}) is given twice",
                pair.first, pair.second
            )));
        }
        let (a, b) = (self.slot(i, j), self.slot(j, i));
        self.entries[b] = Some(PairLaw::Calibrated(pair.clone()));
        self.entries[a] = Some(PairLaw::Calibrated(pair));
        Ok(())
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    /// Law of `(i, j)`, `None` when the pair is missing or out of range
    pub fn get(&self, i: usize, j: usize) -> Option<&PairLaw<S>> {
        let n = self.species.len();
        if i >= n || j >= n {
            return None;
        }
        self.entries[self.slot(i, j)].as_ref()
    }

    /// Binary coefficient of `(i, j)`, `None` when the pair is not calibrated
    pub fn coefficient(
        &self,
        i: usize,
        j: usize,
        temperature: S,
        pressure: S,
        constants: &PlanetConstants,
    ) -> Option<S> {
        self.get(i, j)
            .map(|law| law.coefficient(temperature, pressure, constants))
    }

    /// Pairs of distinct species that have no law
    pub fn missing_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.species.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.get(i, j).is_none())
            .collect()
    }

    /// Every pair of distinct species must have a law for molecular diffusion
    pub fn validate_for_mixture(&self) -> DiffusionResult<()> {
        let missing = self.missing_pairs();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = missing
            .iter()
            .map(|&(i, j)| format!("({}, {})", self.species[i], self.species[j]))
            .collect();
        Err(DiffusionError::invalid(format!(
            "missing binary diffusion calibration for {}",
            names.join(", ")
        )))
    }

    /// Derive missing pairs from the self-diffusion law of the lower-index species.
    ///
    /// Returns the number of pairs derived. Pairs whose lower-index species has
    /// no self-diffusion law are left missing.
    pub fn fill_mass_scaled(&mut self, neutrals: &SpeciesList) -> usize {
        let mut filled = 0;
        for (i, j) in self.missing_pairs() {
            let Some(PairLaw::Calibrated(self_diffusion)) = self.get(i, i).cloned() else {
                continue;
            };
            warn!(
                "No binary diffusion calibration for ({}, {}); scaling the self-diffusion of {} by molar mass",
                self.species[i], self.species[j], self.species[i]
            );
            let law = PairLaw::MassScaled {
                self_diffusion,
                molar_mass_i: S::cast(neutrals.molar_mass(i)),
                molar_mass_j: S::cast(neutrals.molar_mass(j)),
            };
            let (a, b) = (self.slot(i, j), self.slot(j, i));
            self.entries[b] = Some(law.clone());
            self.entries[a] = Some(law);
            filled += 1;
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constants() -> PlanetConstants {
        PlanetConstants::default()
    }

    #[test]
    fn test_power_law_at_reference_state() {
        let c = constants();
        let d: f64 = power_law(273.15, 101325.0, 1.5e-5, 1.75, &c);
        assert_relative_eq!(d, 1.5e-5, max_relative = 1e-14);
    }

    #[test]
    fn test_power_law_inverse_in_pressure() {
        let c = constants();
        let d1: f64 = power_law(200.0, 10.0, 1e-5, 1.8, &c);
        let d2: f64 = power_law(200.0, 20.0, 1e-5, 1.8, &c);
        assert_relative_eq!(d1, 2.0 * d2, max_relative = 1e-14);
    }

    #[test]
    fn test_mass_scaled_lighter_partner() {
        // Mj < Mi
        let d = mass_scaled(2.0_f64, 28.0, 16.0);
        assert_relative_eq!(d, 2.0 * ((16.0 / 28.0 + 1.0) / 2.0_f64).sqrt());
    }

    #[test]
    fn test_mass_scaled_heavier_or_equal_partner() {
        let d = mass_scaled(2.0_f64, 16.0, 28.0);
        assert_relative_eq!(d, 2.0 * (28.0 / 16.0_f64).sqrt());
        assert_relative_eq!(mass_scaled(2.0_f64, 16.0, 16.0), 2.0);
    }

    #[test]
    fn test_massman() {
        let c = constants();
        let law = BinaryDiffusion::new("N2", "N2", 0.1783e-4, 1.81, Correlation::Massman);
        let (t, p) = (150.0_f64, 1e-3);
        let expected = 0.1783e-4 * 101325.0 / p * (t / 273.15_f64).powf(1.81);
        assert_relative_eq!(law.coefficient(t, p, &c), expected, max_relative = 1e-13);
    }

    #[test]
    fn test_wilson_is_inverse_in_number_density() {
        let c = constants();
        let (a, s) = (5.73e12_f64, 0.5);
        let law = BinaryDiffusion::new("CH4", "CH4", a, s, Correlation::Wilson);
        let (t, p) = (150.0_f64, 1e-3);
        let number_density = p / (c.physical.boltzmann * t);
        assert_relative_eq!(
            law.coefficient(t, p, &c),
            a * t.powf(s) / number_density,
            max_relative = 1e-12
        );
        assert_relative_eq!(law.exponent(), 1.5);
    }

    #[test]
    fn test_wakeham() {
        let c = constants();
        let (a, s) = (1.04e-9_f64, 1.76);
        let law = BinaryDiffusion::new("N2", "CH4", a, s, Correlation::Wakeham);
        let (t, p) = (150.0_f64, 1e-3);
        assert_relative_eq!(
            law.coefficient(t, p, &c),
            a * t.powf(s) * 101325.0 / p,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_correlation_names() {
        #[derive(Deserialize)]
        struct Entry {
            correlation: Correlation,
        }
        let entry: Entry = toml::from_str(r#"correlation = "wakeham""#).unwrap();
        assert_eq!(entry.correlation, Correlation::Wakeham);
        assert!(toml::from_str::<Entry>(r#"correlation = "chapman""#).is_err());
        assert_eq!(Correlation::Massman.to_string(), "Massman");
    }

    fn neutrals() -> SpeciesList {
        SpeciesList::from_names(&["N2", "CH4", "H2"]).unwrap()
    }

    #[test]
    fn test_out_of_range_index_has_no_law() {
        let table = BinaryDiffusionTable::from_pairs(
            &neutrals(),
            [BinaryDiffusion::new("CH4", "N2", 1.0_f64, 1.0, Correlation::Wakeham)],
        )
        .unwrap();
        assert!(table.get(1, 0).is_some());
        assert!(table.get(0, 3).is_none());
        assert!(table.get(3, 0).is_none());
        assert!(table
            .coefficient(0, 3, 150.0, 1e-3, &PlanetConstants::default())
            .is_none());
    }

    #[test]
    fn test_table_is_symmetric() {
        let table = BinaryDiffusionTable::from_pairs(
            &neutrals(),
            [BinaryDiffusion::new("N2", "CH4", 1.0_f64, 1.0, Correlation::Wakeham)],
        )
        .unwrap();
        assert_eq!(table.get(0, 1), table.get(1, 0));
        assert!(table.get(0, 1).is_some());
        assert!(table.get(0, 0).is_none());
    }

    #[test]
    fn test_table_reports_missing_pairs() {
        let table = BinaryDiffusionTable::from_pairs(
            &neutrals(),
            [BinaryDiffusion::new("N2", "CH4", 1.0_f64, 1.0, Correlation::Wakeham)],
        )
        .unwrap();
        assert_eq!(table.missing_pairs(), vec![(0, 2), (1, 2)]);
        let err = table.validate_for_mixture().unwrap_err();
        assert!(err.to_string().contains("(N2, H2)"));
    }

    #[test]
    fn test_table_rejects_unknown_and_duplicate() {
        let list = neutrals();
        assert!(BinaryDiffusionTable::from_pairs(
            &list,
            [BinaryDiffusion::new("N2", "Ar", 1.0_f64, 1.0, Correlation::Massman)]
        )
        .is_err());
        assert!(BinaryDiffusionTable::from_pairs(
            &list,
            [
                BinaryDiffusion::new("N2", "CH4", 1.0_f64, 1.0, Correlation::Massman),
                BinaryDiffusion::new("CH4", "N2", 1.0_f64, 1.0, Correlation::Massman),
            ]
        )
        .is_err());
    }

    #[test]
    fn test_fill_mass_scaled() {
        let list = neutrals();
        let c = constants();
        let self_n2 = BinaryDiffusion::new("N2", "N2", 2e-5_f64, 1.8, Correlation::Massman);
        let mut table = BinaryDiffusionTable::from_pairs(
            &list,
            [
                self_n2.clone(),
                BinaryDiffusion::new("N2", "CH4", 1e-9, 1.76, Correlation::Wakeham),
            ],
        )
        .unwrap();

        // (N2, H2) derives from N2 self-diffusion; (CH4, H2) has no CH4 self-diffusion
        assert_eq!(table.fill_mass_scaled(&list), 1);
        assert_eq!(table.missing_pairs(), vec![(1, 2)]);

        let (t, p) = (150.0, 1e-3);
        let expected = mass_scaled(
            self_n2.coefficient(t, p, &c),
            list.molar_mass(0),
            list.molar_mass(2),
        );
        assert_relative_eq!(table.coefficient(2, 0, t, p, &c).unwrap(), expected);
    }
}
