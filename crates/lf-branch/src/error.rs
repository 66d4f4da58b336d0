//! Error types for pressure-drop correlations.

use lf_core::error::LfError;
use thiserror::Error;

/// Errors raised inside a correlation provider.
///
/// The solver treats these as opaque and propagates them unmodified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("{what} = {value} outside valid range [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type CorrelationResult<T> = Result<T, CorrelationError>;

impl From<LfError> for CorrelationError {
    fn from(e: LfError) -> Self {
        match e {
            LfError::NonFinite { what, .. } => CorrelationError::NonPhysical { what },
            LfError::InvalidArg { what } => CorrelationError::InvalidArg { what },
            LfError::Invariant { what } => CorrelationError::Backend {
                message: what.to_string(),
            },
        }
    }
}

impl From<CorrelationError> for LfError {
    fn from(e: CorrelationError) -> Self {
        match e {
            CorrelationError::NonPhysical { what } => LfError::InvalidArg { what },
            CorrelationError::OutOfRange { what, .. } => LfError::InvalidArg { what },
            CorrelationError::InvalidArg { what } => LfError::InvalidArg { what },
            CorrelationError::Backend { message: _ } => LfError::InvalidArg {
                what: "correlation backend error",
            },
        }
    }
}
