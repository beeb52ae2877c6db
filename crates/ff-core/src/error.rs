use std::path::PathBuf;
use thiserror::Error;

pub type FfResult<T> = Result<T, FfError>;

#[derive(Error, Debug)]
pub enum FfError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Missing template for role '{role}': {path}")]
    MissingTemplate { role: String, path: PathBuf },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Quantization error: {what} = {value} cannot be snapped to a multiple of {quantum} ({reason})")]
    Quantization {
        what: String,
        value: f64,
        quantum: f64,
        reason: String,
    },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },
}

impl FfError {
    pub fn config(what: impl Into<String>) -> Self {
        Self::Configuration { what: what.into() }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label of the error kind, used in per-case failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::MissingTemplate { .. } => "missing-template",
            Self::Write { .. } => "write",
            Self::Quantization { .. } => "quantization",
            Self::NonFinite { .. } => "non-finite",
        }
    }
}
