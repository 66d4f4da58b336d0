//! Error types for the digital twin service layer.

use lf_branch::CorrelationError;
use lf_solver::SolverError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TwinError {
    #[error("Variable store error on '{name}': {message}")]
    Store { name: String, message: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type TwinResult<T> = Result<T, TwinError>;
