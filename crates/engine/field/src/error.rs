//! Error types for field generation

use crate::config::MAX_RESOLUTION;
use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;

#[derive(Error, Debug)]
pub enum FieldError {
    /// Normalization divides by `resolution - 1`, so at least two samples per
    /// axis are needed; the upper bound keeps the buffer size representable
    #[error("Invalid resolution {0}: expected 2 to {max} samples per axis", max = MAX_RESOLUTION)]
    InvalidResolution(usize),

    /// The generation was superseded before it finished
    #[error("Generation cancelled: region set changed")]
    Cancelled,

    #[error("Invalid field configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid conceptual space: {0}")]
    Space(String),
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::Space(err.to_string())
    }
}
