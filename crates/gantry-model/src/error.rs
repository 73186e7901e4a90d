use thiserror::Error;

/// Errors produced by model-type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A module-version notation string could not be parsed.
    #[error("invalid module notation '{notation}': {reason}")]
    InvalidNotation { notation: String, reason: String },
}
