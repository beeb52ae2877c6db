//! Error types for the ff-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates, shared by every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read sweep file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Sweep file validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Sweep(#[from] ff_core::FfError),

    #[error("{failed} of {total} cases failed")]
    IncompleteSweep { failed: usize, total: usize },

    #[error("TurbSim batch scripts were not written: {0}")]
    BatchScripts(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ff_project::ProjectError> for AppError {
    fn from(err: ff_project::ProjectError) -> Self {
        match err {
            ff_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ff_project::ValidationError> for AppError {
    fn from(err: ff_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    /// True for problems with the sweep description itself, as opposed to
    /// the filesystem or individual cases.
    pub fn is_configuration(&self) -> bool {
        match self {
            AppError::Validation(_) | AppError::Project(_) => true,
            AppError::Sweep(e) => matches!(
                e,
                ff_core::FfError::Configuration { .. }
                    | ff_core::FfError::MissingTemplate { .. }
                    | ff_core::FfError::Quantization { .. }
                    | ff_core::FfError::NonFinite { .. }
            ),
            _ => false,
        }
    }
}
