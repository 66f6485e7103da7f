//! Inputs shared by the atmospheric diffusion evaluators
//!
//! Everything in this crate is supplied once and stays immutable for the
//! lifetime of an evaluation:
//!
//! - [`altitude::AltitudeGrid`]: equally spaced altitude levels
//! - [`species::SpeciesRegistry`]: neutral and ion-extended species lists
//! - [`temperature::TemperatureProfile`]: temperatures on the grid
//! - [`constants::PlanetConstants`]: universal constants and the planetary body

pub mod altitude;
pub mod constants;
pub mod errors;
pub mod scalar;
pub mod species;
pub mod temperature;

pub use scalar::Scalar;
