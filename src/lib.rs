//! Vertical diffusion of trace species in a one-dimensional planetary atmosphere
//!
//! Re-exports the input types of `planet-core` and the evaluators of
//! `planet-components`, and assembles them into a run described by a TOML
//! [`config::PipelineConfig`].
//!
//! ```no_run
//! use planet::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_file("titan.toml")?;
//! let profiles = planet::pipeline::run::<f64>(&config)?;
//! println!("{}", profiles.omega);
//! # Ok::<(), planet::errors::DiffusionError>(())
//! ```

pub mod config;
pub mod pipeline;

pub use planet_components::components;
pub use planet_core::{altitude, constants, errors, scalar, species, temperature, Scalar};
