//! Structural validation of a sweep file.
//!
//! Checks everything that can be decided from the file alone. Template
//! contents and grid quantization are checked later, still before any
//! output is written.

use crate::schema::{InflowDef, SweepProject, TurbineField};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Turbine {turbine} is missing required field '{field}'")]
    MissingField { turbine: u32, field: &'static str },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Sweep axis '{axis}' must list at least one value")]
    EmptyAxis { axis: &'static str },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

impl From<ValidationError> for ff_core::FfError {
    fn from(err: ValidationError) -> Self {
        ff_core::FfError::Configuration {
            what: err.to_string(),
        }
    }
}

pub fn validate_project(project: &SweepProject) -> Result<(), ValidationError> {
    if project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    if project.turbines.is_empty() {
        return Err(invalid("turbines", "[]", "at least one turbine is required"));
    }

    let mut turbine_ids = HashSet::new();
    for turbine in &project.turbines {
        if !turbine_ids.insert(turbine.id) {
            return Err(ValidationError::DuplicateId {
                id: turbine.id.to_string(),
                context: "turbines".to_string(),
            });
        }

        for (name, v) in [("x_m", turbine.x_m), ("y_m", turbine.y_m), ("z_m", turbine.z_m)] {
            if !v.is_finite() {
                return Err(invalid(
                    format!("turbine {} {}", turbine.id, name),
                    v,
                    "must be finite",
                ));
            }
        }

        for field in TurbineField::ALL {
            let value = turbine
                .resolved(field, &project.turbine_defaults)
                .ok_or(ValidationError::MissingField {
                    turbine: turbine.id,
                    field: field.key(),
                })?;
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(
                    format!("turbine {} {}", turbine.id, field.key()),
                    value,
                    "must be positive and finite",
                ));
            }
        }

        if let Some(phi) = turbine.phi_deg
            && !phi.is_finite()
        {
            return Err(invalid(
                format!("turbine {} phi_deg", turbine.id),
                phi,
                "must be finite",
            ));
        }
    }

    if !turbine_ids.contains(&project.reference_turbine) {
        return Err(ValidationError::MissingReference {
            id: project.reference_turbine.to_string(),
            context: "reference_turbine".to_string(),
        });
    }

    validate_domain(project)?;
    validate_sweep(project)?;

    if let InflowDef::Les { path } = &project.inflow
        && path.as_os_str().is_empty()
    {
        return Err(invalid("inflow.path", "\"\"", "LES inflow needs a path"));
    }

    Ok(())
}

fn validate_domain(project: &SweepProject) -> Result<(), ValidationError> {
    let domain = &project.domain;
    if !domain.tmax_s.is_finite() || domain.tmax_s <= 0.0 {
        return Err(invalid("domain.tmax_s", domain.tmax_s, "must be positive and finite"));
    }
    if !domain.zbot_m.is_finite() {
        return Err(invalid("domain.zbot_m", domain.zbot_m, "must be finite"));
    }
    if domain.n_seeds < 1 {
        return Err(invalid("domain.n_seeds", domain.n_seeds, "must be at least 1"));
    }

    for turbine in &project.turbines {
        let zhub = turbine
            .resolved(TurbineField::Zhub, &project.turbine_defaults)
            .unwrap_or(0.0);
        let d = turbine
            .resolved(TurbineField::D, &project.turbine_defaults)
            .unwrap_or(0.0);
        if zhub - 0.5 * d <= domain.zbot_m {
            return Err(invalid(
                format!("turbine {} zhub_m", turbine.id),
                zhub,
                "blade tip reaches below domain.zbot_m",
            ));
        }
    }

    if let Some(seeds) = &domain.seed_values {
        let mut seen = HashSet::new();
        for seed in seeds {
            if !seen.insert(seed) {
                return Err(ValidationError::DuplicateId {
                    id: seed.to_string(),
                    context: "domain.seed_values".to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_sweep(project: &SweepProject) -> Result<(), ValidationError> {
    let sweep = &project.sweep;
    let axes: [(&'static str, &[f64]); 4] = [
        ("vhub_mps", &sweep.vhub_mps),
        ("shear", &sweep.shear),
        ("ti_percent", &sweep.ti_percent),
        ("inflow_deg", &sweep.inflow_deg),
    ];
    for (axis, values) in axes {
        if values.is_empty() {
            return Err(ValidationError::EmptyAxis { axis });
        }
        for (i, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(invalid(format!("sweep.{axis}[{i}]"), v, "must be finite"));
            }
        }
    }

    for (i, v) in sweep.vhub_mps.iter().enumerate() {
        if *v <= 0.0 {
            return Err(invalid(format!("sweep.vhub_mps[{i}]"), v, "must be positive"));
        }
    }
    for (i, v) in sweep.ti_percent.iter().enumerate() {
        if *v < 0.0 {
            return Err(invalid(format!("sweep.ti_percent[{i}]"), v, "must not be negative"));
        }
    }

    if let Some(rows) = &sweep.yaw_init_deg {
        if rows.len() != sweep.inflow_deg.len() {
            return Err(invalid(
                "sweep.yaw_init_deg",
                format!("{} rows", rows.len()),
                "needs one row per inflow direction",
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != project.turbines.len() {
                return Err(invalid(
                    format!("sweep.yaw_init_deg[{i}]"),
                    format!("{} values", row.len()),
                    "needs one value per turbine",
                ));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("sweep.yaw_init_deg[{i}]"), "NaN", "must be finite"));
            }
        }
    }

    Ok(())
}

fn invalid(
    field: impl Into<String>,
    value: impl ToString,
    reason: impl Into<String>,
) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::example_project;

    #[test]
    fn example_project_is_valid() {
        validate_project(&example_project()).unwrap();
    }

    #[test]
    fn missing_reference_turbine() {
        let mut project = example_project();
        project.reference_turbine = 99;
        let err = validate_project(&project).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReference { .. }));
    }

    #[test]
    fn duplicate_turbine_id() {
        let mut project = example_project();
        project.turbines[1].id = project.turbines[0].id;
        let err = validate_project(&project).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn field_missing_from_turbine_and_defaults() {
        let mut project = example_project();
        project.turbine_defaults.cmax_m = None;
        project.turbines[2].cmax_m = None;
        project.turbines[0].cmax_m = Some(5.0);
        let err = validate_project(&project).unwrap_err();
        match err {
            ValidationError::MissingField { turbine, field } => {
                assert_eq!(field, "cmax_m");
                assert_eq!(turbine, project.turbines[1].id);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_geometry() {
        let mut project = example_project();
        project.turbines[3].fmax_hz = Some(0.0);
        let err = validate_project(&project).unwrap_err();
        assert!(err.to_string().contains("fmax_hz"));
    }

    #[test]
    fn empty_axis() {
        let mut project = example_project();
        project.sweep.shear.clear();
        let err = validate_project(&project).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyAxis { axis: "shear" }));
    }

    #[test]
    fn zero_seeds() {
        let mut project = example_project();
        project.domain.n_seeds = 0;
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn yaw_rows_must_match_directions() {
        let mut project = example_project();
        project.sweep.inflow_deg = vec![0.0, 10.0];
        project.sweep.yaw_init_deg = Some(vec![vec![0.0; project.turbines.len()]]);
        assert!(validate_project(&project).is_err());

        project.sweep.yaw_init_deg = Some(vec![vec![0.0; project.turbines.len()]; 2]);
        validate_project(&project).unwrap();
    }

    #[test]
    fn converts_into_configuration_error() {
        let err: ff_core::FfError = ValidationError::EmptyAxis { axis: "vhub_mps" }.into();
        assert_eq!(err.kind(), "configuration");
        assert!(err.to_string().contains("vhub_mps"));
    }
}
