//! Physical and planetary constants
//!
//! Constants are plain configuration rather than globals: every evaluator
//! receives a [`PlanetConstants`] so that the same pipeline can be run for a
//! different body, or with alternative values of the universal constants.
//!
//! The defaults describe Titan.

use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// Conversion from kilometres to metres
pub const KM_TO_M: f64 = 1e3;

/// Conversion from g/mol to kg/mol
pub const G_TO_KG: f64 = 1e-3;

/// Conversion of a number density from cm⁻³ to m⁻³
pub const PER_CM3_TO_PER_M3: f64 = 1e6;

/// Universal constants and the reference state used by diffusion correlations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Boltzmann constant
    /// unit: J/K
    /// default: 1.3806488e-23
    pub boltzmann: f64,

    /// Avogadro constant
    /// unit: mol^-1
    /// default: 6.02214129e23
    pub avogadro: f64,

    /// Newtonian constant of gravitation
    /// unit: m^3 kg^-1 s^-2
    /// default: 6.67384e-11
    pub gravitational_constant: f64,

    /// Reference ("normal") pressure of the binary diffusion correlations
    /// unit: Pa
    /// default: 101325.0
    pub normal_pressure: f64,

    /// Reference ("standard") temperature of the binary diffusion correlations
    /// unit: K
    /// default: 273.15
    pub standard_temperature: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            boltzmann: 1.3806488e-23,
            avogadro: 6.02214129e23,
            gravitational_constant: 6.67384e-11,
            normal_pressure: 101325.0,
            standard_temperature: 273.15,
        }
    }
}

/// Point-mass description of the planetary body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetBody {
    pub name: String,

    /// Mean radius
    /// unit: km
    pub radius: f64,

    /// Total mass
    /// unit: kg
    pub mass: f64,
}

impl PlanetBody {
    pub fn titan() -> Self {
        Self {
            name: "Titan".to_string(),
            radius: 2575.0,
            mass: 1.3452e23,
        }
    }
}

impl Default for PlanetBody {
    fn default() -> Self {
        Self::titan()
    }
}

/// Everything an evaluator needs to know about physics and the body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConstants {
    pub physical: PhysicalConstants,
    pub body: PlanetBody,
}

impl PlanetConstants {
    pub fn new(physical: PhysicalConstants, body: PlanetBody) -> Self {
        Self { physical, body }
    }

    pub fn boltzmann<S: Scalar>(&self) -> S {
        S::cast(self.physical.boltzmann)
    }

    pub fn avogadro<S: Scalar>(&self) -> S {
        S::cast(self.physical.avogadro)
    }

    pub fn normal_pressure<S: Scalar>(&self) -> S {
        S::cast(self.physical.normal_pressure)
    }

    pub fn standard_temperature<S: Scalar>(&self) -> S {
        S::cast(self.physical.standard_temperature)
    }

    /// Planet radius in km
    pub fn radius<S: Scalar>(&self) -> S {
        S::cast(self.body.radius)
    }

    /// `G·M` of the body
    ///
    /// unit: m^3 s^-2
    pub fn gravitational_parameter<S: Scalar>(&self) -> S {
        S::cast(self.physical.gravitational_constant) * S::cast(self.body.mass)
    }

    /// Point-mass gravity at an altitude given in km
    ///
    /// $$ g(z) = \frac{G M}{((R + z) \cdot 10^3)^2} $$
    ///
    /// unit: m s^-2
    pub fn gravity<S: Scalar>(&self, altitude: S) -> S {
        let distance = (self.radius::<S>() + altitude) * S::cast(KM_TO_M);
        self.gravitational_parameter::<S>() / (distance * distance)
    }

    /// Pressure exerted by a number density given in cm⁻³
    ///
    /// unit: Pa
    pub fn pressure<S: Scalar>(&self, density: S, temperature: S) -> S {
        density * S::cast(PER_CM3_TO_PER_M3) * self.boltzmann::<S>() * temperature
    }

    /// Scale height `k_B T / (g m)` for a molar mass given in kg/mol
    ///
    /// unit: m
    pub fn scale_height<S: Scalar>(&self, temperature: S, altitude: S, molar_mass: S) -> S {
        self.boltzmann::<S>() * temperature
            / (self.gravity(altitude) * molar_mass / self.avogadro::<S>())
    }

    /// Reject constants that would make gravity or scale heights meaningless
    pub fn validate(&self) -> crate::errors::DiffusionResult<()> {
        use crate::errors::DiffusionError;
        let positive = [
            ("boltzmann constant", self.physical.boltzmann),
            ("avogadro constant", self.physical.avogadro),
            ("gravitational constant", self.physical.gravitational_constant),
            ("normal pressure", self.physical.normal_pressure),
            ("standard temperature", self.physical.standard_temperature),
            ("planet radius", self.body.radius),
            ("planet mass", self.body.mass),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DiffusionError::invalid(format!(
                    "{} of {} must be positive and finite, got {}",
                    name, self.body.name, value
                )));
            }
        }
        Ok(())
    }
}
