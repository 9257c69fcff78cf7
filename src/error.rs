//! Error types for the buckling analysis

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;

/// Which stiffness-extraction pass an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPass {
    /// Unloaded pass capturing the reference stiffness K0
    Reference,
    /// Loaded pass capturing the tangent stiffness K1
    Loaded,
}

impl std::fmt::Display for ExtractionPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Loaded => write!(f, "loaded"),
        }
    }
}

/// Main error type for buckling-analysis operations
#[derive(Error, Debug)]
pub enum BucklingError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ConfigError),

    #[error("Stiffness extraction failed in the {pass} pass: {detail}")]
    ModelExtraction {
        pass: ExtractionPass,
        detail: String,
    },

    #[error("No positive eigenvalues found - the applied stress state cannot buckle the plate")]
    NoPositiveEigenvalues,

    #[error("Free-DOF numbering changed between analysis passes on unchanged topology")]
    DofMapMismatch,

    #[error("FE engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for buckling-analysis operations
pub type BucklingResult<T> = Result<T, BucklingError>;
