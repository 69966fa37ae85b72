//! Error types for sectional analysis

use thiserror::Error;

/// Configuration and input errors.
///
/// Solver outcomes (non-convergence, crushing, fracture, singular tangents) are
/// never reported through this type; they are recorded in the
/// [`ResponseCurve`](crate::results::ResponseCurve) so partial results survive.
#[derive(Error, Debug)]
pub enum SectionError {
    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input format '{0}' is not supported")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for sectional analysis operations
pub type SectionResult<T> = Result<T, SectionError>;
