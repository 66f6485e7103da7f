use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum DiffusionError {
    /// Inputs that can never produce a valid evaluation. Raised before any computation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Numeric degeneracy in {component}: {quantity} for species '{species}' at altitude index {altitude_index}")]
    NumericDegeneracy {
        component: &'static str,
        quantity: &'static str,
        species: String,
        altitude_index: usize,
    },
    #[error("Could not ingest {}:{line}: {reason}", path.display())]
    DataIngestion {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse configuration: {0}")]
    ConfigParse(String),
}

impl DiffusionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DiffusionError::InvalidConfiguration(message.into())
    }

    pub fn degenerate(
        component: &'static str,
        quantity: &'static str,
        species: &str,
        altitude_index: usize,
    ) -> Self {
        DiffusionError::NumericDegeneracy {
            component,
            quantity,
            species: species.to_string(),
            altitude_index,
        }
    }
}

/// Convenience type for `Result<T, DiffusionError>`.
pub type DiffusionResult<T> = Result<T, DiffusionError>;
