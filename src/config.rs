//! Run configuration
//!
//! A diffusion run is described by a TOML document:
//!
//! ```toml
//! total_density = 1e12
//! eddy_k0 = 430.0
//!
//! [altitude]
//! min = 600.0
//! max = 1400.0
//! step = 10.0
//!
//! [temperature]
//! file = "temperature.dat"
//!
//! [[species]]
//! name = "N2"
//! fraction = 0.96
//!
//! [[species]]
//! name = "CH4"
//! fraction = 0.04
//!
//! [[binary_diffusion]]
//! species = ["N2", "CH4"]
//! coefficient_1 = 1.04e-9
//! coefficient_2 = 1.76
//! correlation = "wakeham"
//! ```
//!
//! Values are stored in double precision and narrowed to the evaluation
//! precision when the inputs are built.

use log::debug;
use ndarray::Array1;
use planet_components::components::{BinaryDiffusion, BinaryDiffusionTable, Correlation};
use planet_core::altitude::AltitudeGrid;
use planet_core::constants::PlanetConstants;
use planet_core::errors::{DiffusionError, DiffusionResult};
use planet_core::species::{is_ion, Species, SpeciesRegistry};
use planet_core::temperature::{linear_interpolation, read_temperature_file, TemperatureProfile};
use planet_core::Scalar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Altitude grid bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeConfig {
    /// unit: km
    pub min: f64,
    /// unit: km
    pub max: f64,
    /// unit: km
    pub step: f64,
}

/// A species of the column.
///
/// Neutral and ionic species may be listed in any order; neutrals keep their
/// relative order and are placed ahead of the ions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub name: String,

    /// Molar mass, looked up from the species name when absent
    /// unit: g/mol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molar_mass: Option<f64>,

    /// Molar fraction at the bottom of the column
    /// unit: dimensionless
    /// default: 0.0
    #[serde(default)]
    pub fraction: f64,

    /// Thermal diffusion factor
    /// unit: dimensionless
    /// default: 0.0
    #[serde(default)]
    pub thermal_coefficient: f64,

    /// Whether the species is an ion, inferred from a trailing `+` or `-` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ion: Option<bool>,
}

impl SpeciesConfig {
    pub fn is_ion(&self) -> bool {
        self.ion.unwrap_or_else(|| is_ion(&self.name))
    }

    fn species(&self) -> DiffusionResult<Species> {
        match self.molar_mass {
            Some(m) => Ok(Species::new(&self.name, m)),
            None => Species::known(&self.name),
        }
    }
}

/// Calibration of one binary diffusion pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryDiffusionConfig {
    pub species: [String; 2],
    pub coefficient_1: f64,
    pub coefficient_2: f64,
    pub correlation: Correlation,
}

/// Where the neutral temperature profile comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemperatureConfig {
    /// Measurement file, relative paths resolved against the configuration file
    File { file: PathBuf },
    /// Inline measurements, interpolated onto the grid
    Table {
        altitude: Vec<f64>,
        temperature: Vec<f64>,
    },
    /// Constant temperature (K)
    Isothermal { isothermal: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Total number density at the bottom of the column
    /// unit: cm^-3
    pub total_density: f64,

    /// Eddy diffusion coefficient at the bottom of the column
    /// unit: m^2/s
    pub eddy_k0: f64,

    /// Derive missing binary pairs from self-diffusion and molar masses
    /// default: false
    #[serde(default)]
    pub mass_scaled_fallback: bool,

    pub altitude: AltitudeConfig,

    #[serde(default)]
    pub constants: PlanetConstants,

    pub temperature: TemperatureConfig,

    pub species: Vec<SpeciesConfig>,

    #[serde(default)]
    pub binary_diffusion: Vec<BinaryDiffusionConfig>,

    /// Directory relative temperature files are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> DiffusionResult<Self> {
        toml::from_str(content).map_err(|e| DiffusionError::ConfigParse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> DiffusionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DiffusionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> DiffusionResult<String> {
        toml::to_string(self).map_err(|e| DiffusionError::ConfigParse(e.to_string()))
    }

    pub fn grid<S: Scalar>(&self) -> DiffusionResult<AltitudeGrid<S>> {
        AltitudeGrid::new(
            S::cast(self.altitude.min),
            S::cast(self.altitude.max),
            S::cast(self.altitude.step),
        )
    }

    fn neutrals(&self) -> impl Iterator<Item = &SpeciesConfig> {
        self.species.iter().filter(|s| !s.is_ion())
    }

    fn ions(&self) -> impl Iterator<Item = &SpeciesConfig> {
        self.species.iter().filter(|s| s.is_ion())
    }

    pub fn registry(&self) -> DiffusionResult<SpeciesRegistry> {
        let neutrals = self
            .neutrals()
            .map(SpeciesConfig::species)
            .collect::<DiffusionResult<Vec<_>>>()?;
        let ions = self
            .ions()
            .map(SpeciesConfig::species)
            .collect::<DiffusionResult<Vec<_>>>()?;
        SpeciesRegistry::new(neutrals, ions)
    }

    /// Molar fractions over the full species list, in registry order
    pub fn molar_fractions<S: Scalar>(&self) -> Array1<S> {
        self.neutrals()
            .chain(self.ions())
            .map(|s| S::cast(s.fraction))
            .collect()
    }

    /// Thermal diffusion factors of the neutral species, in registry order
    pub fn thermal_coefficients<S: Scalar>(&self) -> Array1<S> {
        self.neutrals()
            .map(|s| S::cast(s.thermal_coefficient))
            .collect()
    }

    pub fn binary_diffusion_table<S: Scalar>(
        &self,
        registry: &SpeciesRegistry,
    ) -> DiffusionResult<BinaryDiffusionTable<S>> {
        let mut table = BinaryDiffusionTable::from_pairs(
            registry.neutrals(),
            self.binary_diffusion.iter().map(|pair| {
                BinaryDiffusion::new(
                    &pair.species[0],
                    &pair.species[1],
                    S::cast(pair.coefficient_1),
                    S::cast(pair.coefficient_2),
                    pair.correlation,
                )
            }),
        )?;
        if self.mass_scaled_fallback {
            let filled = table.fill_mass_scaled(registry.neutrals());
            if filled > 0 {
                debug!("{} binary diffusion pairs derived by mass scaling", filled);
            }
        }
        Ok(table)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }

    pub fn temperature<S: Scalar>(
        &self,
        grid: &AltitudeGrid<S>,
    ) -> DiffusionResult<TemperatureProfile<S>> {
        match &self.temperature {
            TemperatureConfig::File { file } => {
                let measurements = read_temperature_file::<S>(self.resolve(file))?;
                TemperatureProfile::from_measurements(&measurements, grid)
            }
            TemperatureConfig::Table {
                altitude,
                temperature,
            } => {
                let altitude: Array1<S> = altitude.iter().map(|&z| S::cast(z)).collect();
                let temperature: Array1<S> = temperature.iter().map(|&t| S::cast(t)).collect();
                let neutral = linear_interpolation(
                    &temperature,
                    &altitude,
                    &grid.altitudes(),
                )?;
                TemperatureProfile::isothermal_species(&neutral, grid)
            }
            TemperatureConfig::Isothermal { isothermal } => TemperatureProfile::isothermal_species(
                &Array1::from_elem(grid.len(), S::cast(*isothermal)),
                grid,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    const MINIMAL: &str = r#"
total_density = 1e12
eddy_k0 = 430.0

[altitude]
min = 600.0
max = 700.0
step = 10.0

[temperature]
isothermal = 150.0

[[species]]
name = "N2+"

[[species]]
name = "N2"
fraction = 0.96

[[species]]
name = "CH4"
fraction = 0.04
thermal_coefficient = -0.3

[[binary_diffusion]]
species = ["N2", "CH4"]
coefficient_1 = 1.04e-9
coefficient_2 = 1.76
correlation = "wakeham"
"#;

    #[test]
    fn test_parse_minimal() {
        let config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.constants, PlanetConstants::default());
        assert!(!config.mass_scaled_fallback);
        assert_eq!(
            config.temperature,
            TemperatureConfig::Isothermal { isothermal: 150.0 }
        );
        assert_eq!(config.binary_diffusion[0].correlation, Correlation::Wakeham);
    }

    #[test]
    fn test_ions_are_placed_after_neutrals() {
        let config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.neutrals().names(), vec!["N2", "CH4"]);
        assert_eq!(registry.full().names(), vec!["N2", "CH4", "N2+"]);
        assert_eq!(config.molar_fractions::<f64>().to_vec(), vec![0.96, 0.04, 0.0]);
        assert_eq!(config.thermal_coefficients::<f64>().to_vec(), vec![0.0, -0.3]);
    }

    #[test]
    fn test_explicit_molar_mass_and_ion_flag() {
        let mut config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        config.species.push(SpeciesConfig {
            name: "X".to_string(),
            molar_mass: Some(50.0),
            fraction: 0.0,
            thermal_coefficient: 0.0,
            ion: Some(true),
        });
        let registry = config.registry().unwrap();
        assert_eq!(registry.n_ions(), 2);
        assert_eq!(registry.full().molar_mass(3), 50.0);
    }

    #[test]
    fn test_unknown_species_is_rejected() {
        let content = MINIMAL.replace("\"CH4\"\nfraction", "\"Unobtainium\"\nfraction");
        let config = PipelineConfig::from_toml_str(&content).unwrap();
        assert!(matches!(
            config.registry(),
            Err(DiffusionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        for content in ["total_density = ", "eddy_k0 = 1.0"] {
            assert!(matches!(
                PipelineConfig::from_toml_str(content),
                Err(DiffusionError::ConfigParse(_))
            ));
        }
    }

    #[test]
    fn test_round_trip() {
        let config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        let serialised = config.to_toml_string().unwrap();
        let parsed = PipelineConfig::from_toml_str(&serialised).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_inline_temperature_table() {
        let content = MINIMAL.replace(
            "isothermal = 150.0",
            "altitude = [600.0, 700.0]\ntemperature = [150.0, 160.0]",
        );
        let config = PipelineConfig::from_toml_str(&content).unwrap();
        let grid = config.grid::<f64>().unwrap();
        let temperature = config.temperature(&grid).unwrap();
        assert!(is_close!(temperature.neutral()[5], 155.0));
        assert_eq!(temperature.ion(), temperature.neutral());
    }

    #[test]
    fn test_missing_temperature_file() {
        let mut config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        config.temperature = TemperatureConfig::File {
            file: PathBuf::from("does-not-exist.dat"),
        };
        config.base_dir = Some(PathBuf::from("/nonexistent"));
        let grid = config.grid::<f64>().unwrap();
        match config.temperature(&grid) {
            Err(DiffusionError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/does-not-exist.dat"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mass_scaled_fallback_fills_missing_pairs() {
        let mut config = PipelineConfig::from_toml_str(MINIMAL).unwrap();
        config.binary_diffusion.push(BinaryDiffusionConfig {
            species: ["N2".to_string(), "N2".to_string()],
            coefficient_1: 1.783e-5,
            coefficient_2: 1.81,
            correlation: Correlation::Massman,
        });
        config.binary_diffusion.push(BinaryDiffusionConfig {
            species: ["CH4".to_string(), "CH4".to_string()],
            coefficient_1: 5.73e12,
            coefficient_2: 0.5,
            correlation: Correlation::Wilson,
        });
        config.species.push(SpeciesConfig {
            name: "H2".to_string(),
            molar_mass: None,
            fraction: 0.0,
            thermal_coefficient: 0.0,
            ion: None,
        });
        let registry = config.registry().unwrap();

        let strict = config.binary_diffusion_table::<f64>(&registry).unwrap();
        assert!(strict.validate_for_mixture().is_err());

        config.mass_scaled_fallback = true;
        let table = config.binary_diffusion_table::<f64>(&registry).unwrap();
        assert!(table.validate_for_mixture().is_ok());
        assert!(table.missing_pairs().is_empty());
    }
}
