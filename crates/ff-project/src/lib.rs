//! ff-project: canonical sweep file format and validation.

pub mod example;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use example::example_project;
pub use schema::*;
pub use validate::{ValidationError, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk encoding of a sweep file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` is JSON; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

pub fn parse(text: &str, format: Format) -> ProjectResult<SweepProject> {
    let project: SweepProject = match format {
        Format::Yaml => serde_yaml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
    };
    validate_project(&project)?;
    Ok(project)
}

pub fn render(project: &SweepProject, format: Format) -> ProjectResult<String> {
    validate_project(project)?;
    Ok(match format {
        Format::Yaml => serde_yaml::to_string(project)?,
        Format::Json => serde_json::to_string_pretty(project)?,
    })
}

pub fn load(path: &Path) -> ProjectResult<SweepProject> {
    parse(&std::fs::read_to_string(path)?, Format::from_path(path))
}

pub fn save(path: &Path, project: &SweepProject) -> ProjectResult<()> {
    std::fs::write(path, render(project, Format::from_path(path))?)?;
    Ok(())
}

pub fn load_yaml(path: &Path) -> ProjectResult<SweepProject> {
    parse(&std::fs::read_to_string(path)?, Format::Yaml)
}

pub fn save_yaml(path: &Path, project: &SweepProject) -> ProjectResult<()> {
    std::fs::write(path, render(project, Format::Yaml)?)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<SweepProject> {
    parse(&std::fs::read_to_string(path)?, Format::Json)
}

pub fn save_json(path: &Path, project: &SweepProject) -> ProjectResult<()> {
    std::fs::write(path, render(project, Format::Json)?)?;
    Ok(())
}
