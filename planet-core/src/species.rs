//! Species registry
//!
//! A column carries two related species lists:
//!
//! - the *neutral* list, over which densities, binary diffusion and the
//!   diffusion terms are evaluated;
//! - the *full* list, which is the neutral list followed by the ionic
//!   species.
//!
//! The neutral list is always a strict prefix of the full list, so a species
//! index into the neutral list is also a valid index into the full list.

use crate::errors::{DiffusionError, DiffusionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Standard atomic weights used to build molar masses (g/mol)
const ATOMIC_WEIGHTS: [(&str, f64); 6] = [
    ("H", 1.008),
    ("He", 4.002602),
    ("C", 12.011),
    ("N", 14.008),
    ("O", 15.999),
    ("Ar", 39.948),
];

/// Elemental composition of the species the static table knows about.
///
/// Ions share the molar mass of their neutral parent.
const KNOWN_SPECIES: [(&str, &[(&str, u32)]); 20] = [
    ("N2", &[("N", 2)]),
    ("CH4", &[("C", 1), ("H", 4)]),
    ("H2", &[("H", 2)]),
    ("H", &[("H", 1)]),
    ("N", &[("N", 1)]),
    ("Ar", &[("Ar", 1)]),
    ("He", &[("He", 1)]),
    ("CO", &[("C", 1), ("O", 1)]),
    ("CO2", &[("C", 1), ("O", 2)]),
    ("H2O", &[("H", 2), ("O", 1)]),
    ("C2H2", &[("C", 2), ("H", 2)]),
    ("C2H4", &[("C", 2), ("H", 4)]),
    ("C2H6", &[("C", 2), ("H", 6)]),
    ("C3H8", &[("C", 3), ("H", 8)]),
    ("C4H2", &[("C", 4), ("H", 2)]),
    ("HCN", &[("H", 1), ("C", 1), ("N", 1)]),
    ("HC3N", &[("H", 1), ("C", 3), ("N", 1)]),
    ("CH3", &[("C", 1), ("H", 3)]),
    ("NH3", &[("N", 1), ("H", 3)]),
    ("C6H6", &[("C", 6), ("H", 6)]),
];

fn atomic_weight(element: &str) -> Option<f64> {
    ATOMIC_WEIGHTS
        .iter()
        .find(|(symbol, _)| *symbol == element)
        .map(|(_, weight)| *weight)
}

/// Look up the molar mass (g/mol) of a species by name.
///
/// Trailing charge markers (`+`, `-`) are ignored so that `N2+` resolves to
/// the mass of `N2`.
pub fn known_molar_mass(name: &str) -> Option<f64> {
    let neutral = name.trim_end_matches(['+', '-']);
    let (_, composition) = KNOWN_SPECIES.iter().find(|(n, _)| *n == neutral)?;
    composition
        .iter()
        .map(|(element, count)| atomic_weight(element).map(|w| w * f64::from(*count)))
        .sum()
}

/// Whether a species name denotes an ion
pub fn is_ion(name: &str) -> bool {
    name.ends_with('+') || name.ends_with('-')
}

/// A chemical species and its molar mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    /// unit: g/mol
    pub molar_mass: f64,
}

impl Species {
    pub fn new(name: &str, molar_mass: f64) -> Self {
        Self {
            name: name.to_string(),
            molar_mass,
        }
    }

    /// Build a species using the static molar mass table
    pub fn known(name: &str) -> DiffusionResult<Self> {
        known_molar_mass(name)
            .map(|m| Self::new(name, m))
            .ok_or_else(|| {
                DiffusionError::invalid(format!("no molar mass known for species '{}'", name))
            })
    }
}

/// Ordered list of species
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeciesList {
    species: Vec<Species>,
}

impl SpeciesList {
    pub fn new(species: Vec<Species>) -> DiffusionResult<Self> {
        let mut seen = HashSet::new();
        for s in species.iter() {
            if !seen.insert(s.name.as_str()) {
                return Err(DiffusionError::invalid(format!(
                    "species '{}' is listed twice",
                    s.name
                )));
            }
            if !(s.molar_mass.is_finite() && s.molar_mass > 0.0) {
                return Err(DiffusionError::invalid(format!(
                    "molar mass of '{}' must be positive, got {}",
                    s.name, s.molar_mass
                )));
            }
        }
        Ok(Self { species })
    }

    /// Build a list from names using the static molar mass table
    pub fn from_names(names: &[&str]) -> DiffusionResult<Self> {
        Self::new(
            names
                .iter()
                .map(|n| Species::known(n))
                .collect::<DiffusionResult<Vec<_>>>()?,
        )
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    pub fn name(&self, index: usize) -> &str {
        &self.species[index].name
    }

    /// Molar mass in g/mol
    pub fn molar_mass(&self, index: usize) -> f64 {
        self.species[index].molar_mass
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.species.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether `self` is a prefix of `other` (same species, same order)
    pub fn is_prefix_of(&self, other: &SpeciesList) -> bool {
        self.len() <= other.len() && self.species.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

/// Neutral and ion-extended species lists of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRegistry {
    neutrals: SpeciesList,
    full: SpeciesList,
}

impl SpeciesRegistry {
    /// Build the registry by appending `ions` to `neutrals`
    pub fn new(neutrals: Vec<Species>, ions: Vec<Species>) -> DiffusionResult<Self> {
        let full = SpeciesList::new(neutrals.iter().cloned().chain(ions).collect())?;
        let neutrals = SpeciesList::new(neutrals)?;
        Self::from_lists(neutrals, full)
    }

    /// Build the registry from two explicit lists, checking the prefix relation
    pub fn from_lists(neutrals: SpeciesList, full: SpeciesList) -> DiffusionResult<Self> {
        if neutrals.is_empty() {
            return Err(DiffusionError::invalid("at least one neutral species is required"));
        }
        if !neutrals.is_prefix_of(&full) {
            return Err(DiffusionError::invalid(format!(
                "neutral species {:?} must be a prefix of the full species list {:?}",
                neutrals.names(),
                full.names()
            )));
        }
        Ok(Self { neutrals, full })
    }

    /// Build a registry from names using the static molar mass table
    pub fn from_names(neutrals: &[&str], ions: &[&str]) -> DiffusionResult<Self> {
        let known = |names: &[&str]| -> DiffusionResult<Vec<Species>> {
            names.iter().map(|n| Species::known(n)).collect()
        };
        Self::new(known(neutrals)?, known(ions)?)
    }

    pub fn neutrals(&self) -> &SpeciesList {
        &self.neutrals
    }

    pub fn full(&self) -> &SpeciesList {
        &self.full
    }

    pub fn n_neutrals(&self) -> usize {
        self.neutrals.len()
    }

    pub fn n_ions(&self) -> usize {
        self.full.len() - self.neutrals.len()
    }

    /// Ionic species, i.e. the tail of the full list
    pub fn ions(&self) -> impl Iterator<Item = &Species> {
        self.full.iter().skip(self.neutrals.len())
    }
}
