//! Case directory structurer.
//!
//! Planning is pure: [`plan_case`] renders every file of one case in memory.
//! [`materialize`] writes the plan under the case directory, and
//! [`materialize_low_box`] writes the low-resolution box the case shares
//! with the other directions of its condition.

use crate::boxes::{self, BoxDescriptor};
use crate::context::{InflowSource, SweepInputs};
use crate::enumerate::Case;
use crate::jobs;
use crate::template::TokenValues;
use crate::templates::{ResolvedTemplate, TemplateBody, TemplateRole};
use crate::writer::{self, PlannedFile};
use ff_core::{FfError, FfResult};
use ff_domain::PlacedTurbine;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CasePlan {
    pub files: Vec<PlannedFile>,
    pub boxes: Vec<BoxDescriptor>,
    pub job_script: Option<PathBuf>,
}

/// Result of materializing one case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFiles {
    pub case_index: usize,
    pub dir: PathBuf,
    /// Written files, relative to `dir`.
    pub files: Vec<PathBuf>,
    pub boxes: Vec<BoxDescriptor>,
    pub job_script: Option<PathBuf>,
}

fn render(template: &ResolvedTemplate, values: &TokenValues) -> FfResult<Vec<u8>> {
    match &template.body {
        TemplateBody::Text(t) => Ok(t.render(values)?.into_bytes()),
        TemplateBody::Binary(bytes) => Ok(bytes.clone()),
    }
}

/// Stamped solver inputs for one case: per-turbine files for every turbine
/// plus one copy of each farm-level file.
pub fn plan_case_files(
    case: &Case,
    placed: &[PlacedTurbine],
    inputs: &SweepInputs,
) -> FfResult<Vec<PlannedFile>> {
    let mut files = Vec::new();
    let farm = inputs.farm_tokens(case, placed)?;
    for template in inputs.templates.case_templates() {
        if template.is_per_turbine() {
            for p in placed {
                let values = inputs.turbine_tokens(case, p)?;
                files.push(PlannedFile {
                    path: PathBuf::from(template.output_name(p.id)),
                    bytes: render(template, &values)?,
                    executable: false,
                });
            }
        } else {
            files.push(PlannedFile {
                path: PathBuf::from(template.output_name(inputs.layout.reference().id)),
                bytes: render(template, &farm)?,
                executable: false,
            });
        }
    }
    Ok(files)
}

pub fn plan_case(case: &Case, inputs: &SweepInputs) -> FfResult<CasePlan> {
    let placed = inputs.layout.rotated(case.condition.inflow_deg);
    let mut files = plan_case_files(case, &placed, inputs)?;

    // The low box is listed but written once per condition and seed.
    let mut descriptors = Vec::new();
    if let InflowSource::TurbSim = inputs.inflow {
        descriptors.push(boxes::setup_low_res_box(case, inputs)?);
        for (descriptor, text) in boxes::render_high_boxes(case, &placed, inputs)? {
            files.push(PlannedFile {
                path: descriptor.input_path.clone(),
                bytes: text.into_bytes(),
                executable: false,
            });
            descriptors.push(descriptor);
        }
    }

    let fastfarm_input = inputs
        .templates
        .get(TemplateRole::FastFarm)
        .map(|t| t.output_name(inputs.layout.reference().id))
        .ok_or_else(|| FfError::config("a 'fastfarm' template is required"))?;
    let mut job_script = None;
    if let Some(template) = inputs.scripts.fastfarm.as_ref() {
        let ctx = jobs::case_job(case, inputs, &fastfarm_input);
        let path = PathBuf::from(jobs::CASE_SCRIPT);
        files.push(PlannedFile {
            path: path.clone(),
            bytes: jobs::render_submission_script(template, &ctx)?.into_bytes(),
            executable: true,
        });
        job_script = Some(path);
    }

    let mut seen = BTreeSet::new();
    for file in &files {
        if !seen.insert(&file.path) {
            return Err(FfError::write(
                inputs.case_dir(case).join(&file.path),
                "two generated files share this path",
            ));
        }
    }

    Ok(CasePlan {
        files,
        boxes: descriptors,
        job_script,
    })
}

/// Create the case directory and write every file of the case into it.
///
/// On failure the directory keeps an `.incomplete` marker holding the error.
pub fn materialize(case: &Case, inputs: &SweepInputs) -> FfResult<CaseFiles> {
    let dir = inputs.case_dir(case);
    let result = plan_case(case, inputs).and_then(|plan| {
        let files = writer::write_case(&dir, &case.job_name(), &plan.files)?;
        Ok((plan, files))
    });
    match result {
        Ok((plan, files)) => {
            debug!(case = %case.job_name(), files = files.len(), "case materialized");
            Ok(CaseFiles {
                case_index: case.index,
                dir,
                files,
                boxes: plan.boxes,
                job_script: plan.job_script,
            })
        }
        Err(e) => {
            writer::mark_incomplete(&dir, &e.to_string());
            Err(e)
        }
    }
}

/// Write the low-resolution box input of `case` into its shared directory.
pub fn materialize_low_box(case: &Case, inputs: &SweepInputs) -> FfResult<BoxDescriptor> {
    let (descriptor, text) = boxes::render_low_box(case, inputs)?;
    let dir = inputs.base_path.join(&descriptor.dir);
    let file = PlannedFile {
        path: descriptor.input_path.clone(),
        bytes: text.into_bytes(),
        executable: false,
    };
    let label = format!("{}_{}", case.condition_name, case.seed_dir_name());
    match writer::write_case(&dir, &label, &[file]) {
        Ok(_) => {
            debug!(low_box = %label, "low-resolution box materialized");
            Ok(descriptor)
        }
        Err(e) => {
            writer::mark_incomplete(&dir, &e.to_string());
            Err(e)
        }
    }
}
