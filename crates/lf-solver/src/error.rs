//! Error types for balance solving.

use lf_branch::CorrelationError;
use lf_core::error::LfError;
use std::fmt;
use thiserror::Error;

/// Why the outer pressure bracket failed.
#[derive(Debug, Clone, PartialEq)]
pub enum OuterBracketReason {
    /// Net signed flow has the same sign at both ends of the guard band.
    NoSignChange { residual_lo: f64, residual_hi: f64 },
    /// A branch cannot reach an endpoint pressure within its flow bracket.
    BranchUnreachable { branch: String, target_pa: f64 },
}

impl fmt::Display for OuterBracketReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OuterBracketReason::NoSignChange {
                residual_lo,
                residual_hi,
            } => write!(
                f,
                "net flow {residual_lo:.6e} and {residual_hi:.6e} kg/s share a sign"
            ),
            OuterBracketReason::BranchUnreachable { branch, target_pa } => {
                write!(f, "branch '{branch}' cannot reach {target_pa:.3} Pa")
            }
        }
    }
}

/// Errors that can occur during a balance solve.
///
/// Every variant is fatal to the solve: there is no partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error(
        "No bracket for branch '{branch}': target {target_pa:.3} Pa outside reachable range over \
         [{lo}, {hi}] kg/s (residuals {residual_lo:.3e}, {residual_hi:.3e} Pa)"
    )]
    NoBracket {
        branch: String,
        target_pa: f64,
        lo: f64,
        hi: f64,
        residual_lo: f64,
        residual_hi: f64,
    },

    #[error("Outer bracket [{lo_pa:.3}, {hi_pa:.3}] Pa does not enclose a balance: {reason}")]
    OuterBracket {
        lo_pa: f64,
        hi_pa: f64,
        reason: OuterBracketReason,
    },

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for LfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::NoBracket { .. } => LfError::InvalidArg { what: "no bracket" },
            SolverError::OuterBracket { .. } => LfError::InvalidArg {
                what: "outer bracket",
            },
            SolverError::Correlation(err) => err.into(),
            SolverError::ConvergenceFailed { .. } => LfError::Invariant {
                what: "convergence",
            },
            SolverError::ProblemSetup { .. } => LfError::InvalidArg {
                what: "problem setup",
            },
        }
    }
}
