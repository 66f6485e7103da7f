//! Diffusion components of the atmospheric column
//!
//! Evaluated in order, each stage reading the results of the previous ones:
//!
//! - `BinaryDiffusionTable`: calibrated binary diffusion laws for neutral pairs
//! - `AtmosphericComposition`: barometric densities, fractions and scale heights
//! - `MolecularDiffusion`: effective molecular diffusion coefficient per species
//! - `EddyDiffusion`: turbulent mixing coefficient
//! - `Diffusion`: net diffusive transport term at interior levels

pub mod binary_diffusion;
pub mod composition;
pub mod diffusion;
pub mod eddy_diffusion;
pub mod molecular_diffusion;

pub use binary_diffusion::{BinaryDiffusion, BinaryDiffusionTable, Correlation, PairLaw};
pub use composition::AtmosphericComposition;
pub use diffusion::Diffusion;
pub use eddy_diffusion::EddyDiffusion;
pub use molecular_diffusion::MolecularDiffusion;
