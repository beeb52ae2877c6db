//! Sweep file loading, saving and validation.

use crate::error::{AppError, AppResult};
use ff_project::Format;
use ff_project::schema::SweepProject;
use std::path::{Path, PathBuf};

/// Load a sweep file, YAML or JSON by extension, and validate its structure.
pub fn load_project(path: &Path) -> AppResult<SweepProject> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ff_project::parse(&content, Format::from_path(path))?)
}

pub fn save_project(path: &Path, project: &SweepProject) -> AppResult<()> {
    let content = ff_project::render(project, Format::from_path(path))?;
    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

pub fn validate_project(project: &SweepProject) -> AppResult<()> {
    ff_project::validate_project(project)?;
    Ok(())
}

/// Directory that relative paths in the sweep file are resolved against.
pub fn project_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
