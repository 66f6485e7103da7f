//! Assembly of a full diffusion evaluation
//!
//! Stages run bottom-up, each consuming only the results of earlier ones:
//! composition, molecular diffusion, eddy diffusion and finally the net
//! diffusion term. The first failing stage aborts the run.

use crate::config::PipelineConfig;
use log::info;
use ndarray::{Array1, Array2};
use planet_components::components::{
    AtmosphericComposition, BinaryDiffusionTable, Diffusion, EddyDiffusion, MolecularDiffusion,
};
use planet_core::errors::DiffusionResult;
use planet_core::Scalar;
use serde::{Deserialize, Serialize};

/// Every evaluated stage of a column
#[derive(Debug, Clone)]
pub struct Pipeline<S: Scalar> {
    pub composition: AtmosphericComposition<S>,
    pub molecular: MolecularDiffusion<S>,
    pub eddy: EddyDiffusion<S>,
    pub diffusion: Diffusion<S>,
}

impl<S: Scalar> Pipeline<S> {
    /// Evaluate the diffusion stages on an existing composition
    pub fn new(
        composition: AtmosphericComposition<S>,
        table: &BinaryDiffusionTable<S>,
        eddy_k0: S,
    ) -> DiffusionResult<Self> {
        let molecular = MolecularDiffusion::new(&composition, table)?;
        let eddy = EddyDiffusion::new(&composition, eddy_k0)?;
        let diffusion = Diffusion::new(&composition, &molecular, &eddy)?;
        Ok(Self {
            composition,
            molecular,
            eddy,
            diffusion,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> DiffusionResult<Self> {
        let grid = config.grid::<S>()?;
        let registry = config.registry()?;
        let temperature = config.temperature(&grid)?;
        let table = config.binary_diffusion_table::<S>(&registry)?;
        let composition = AtmosphericComposition::new(
            &registry,
            &grid,
            &temperature,
            &config.constants,
            &config.molar_fractions::<S>(),
            S::cast(config.total_density),
        )?
        .with_thermal_coefficients(&config.thermal_coefficients::<S>())?;
        Self::new(composition, &table, S::cast(config.eddy_k0))
    }

    pub fn profiles(&self) -> DiffusionProfiles<S> {
        let composition = &self.composition;
        DiffusionProfiles {
            species: composition
                .registry()
                .neutrals()
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
            altitude: composition.grid().altitudes().to_owned(),
            temperature: composition.temperature().neutral().to_owned(),
            total_density: composition.total_density().to_owned(),
            density: composition.density().to_owned(),
            scale_height: composition.scale_height().to_owned(),
            atmosphere_scale_height: composition.atmosphere_scale_height().to_owned(),
            dtilde: self.molecular.dtilde().to_owned(),
            eddy: self.eddy.k().to_owned(),
            omega: self.diffusion.omega().to_owned(),
        }
    }
}

/// Output tables of an evaluation.
///
/// Per-species tables have shape [species][altitude], over the neutral species.
/// `omega` covers interior levels only: column `i` is altitude index `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionProfiles<S: Scalar> {
    pub species: Vec<String>,
    /// unit: km
    pub altitude: Array1<S>,
    /// unit: K
    pub temperature: Array1<S>,
    /// unit: cm^-3
    pub total_density: Array1<S>,
    /// unit: cm^-3
    pub density: Array2<S>,
    /// unit: m
    pub scale_height: Array2<S>,
    /// unit: m
    pub atmosphere_scale_height: Array1<S>,
    /// Effective molecular diffusion coefficient
    /// unit: m^2/s
    pub dtilde: Array2<S>,
    /// Eddy diffusion coefficient
    /// unit: m^2/s
    pub eddy: Array1<S>,
    /// Net diffusion term, gradients taken per km of grid altitude
    pub omega: Array2<S>,
}

/// Build and evaluate every stage described by `config`
pub fn run<S: Scalar>(config: &PipelineConfig) -> DiffusionResult<DiffusionProfiles<S>> {
    info!(
        "Evaluating diffusion for {} species on {}..{} km",
        config.species.len(),
        config.altitude.min,
        config.altitude.max
    );
    let pipeline = Pipeline::<S>::from_config(config)?;
    let profiles = pipeline.profiles();
    info!(
        "Diffusion evaluated over {} levels ({} interior)",
        profiles.altitude.len(),
        profiles.omega.ncols()
    );
    Ok(profiles)
}
