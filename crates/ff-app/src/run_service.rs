//! Sweep preparation and execution.
//!
//! [`prepare_sweep`] does every check that can fail for configuration
//! reasons (structure, layout, sizing, templates, naming) without touching
//! the output tree. [`execute_sweep`] then writes it.

use crate::error::{AppError, AppResult};
use crate::project_service::{load_project, project_root, resolve};
use crate::sweep_compile::*;
use ff_domain::{DomainParameters, Layout, compute_domain_parameters};
use ff_sweep::{Case, SweepInputs, SweepSummary, check_unique_dirs, enumerate_cases, run_sweep};
use std::path::Path;
use tracing::info;

/// A fully resolved sweep, ready to be written.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub name: String,
    pub inputs: SweepInputs,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Worker threads; `None` uses the rayon default.
    pub jobs: Option<usize>,
}

/// Layout plus domain parameters, without templates.
pub fn compute_domain(path: &Path) -> AppResult<(Layout, DomainParameters)> {
    let project = load_project(path)?;
    let layout = build_layout(&project)?;
    let global = build_global(&project)?;
    let axes = build_axes(&project.sweep);
    let domain = compute_domain_parameters(&layout, &global, &axes)?;
    Ok((layout, domain))
}

pub fn prepare_sweep(path: &Path) -> AppResult<SweepPlan> {
    let project = load_project(path)?;
    let root = project_root(path);

    let layout = build_layout(&project)?;
    let global = build_global(&project)?;
    let axes = build_axes(&project.sweep);
    let domain = compute_domain_parameters(&layout, &global, &axes)?;
    let templates = build_templates(&project, &root)?;
    let scripts = build_scripts(&project.scripts, &root)?;
    let cases = enumerate_cases(&axes, global.n_seeds)?;

    let inputs = SweepInputs {
        base_path: resolve(&root, &project.base_path),
        seed_values: build_seed_values(&project.domain),
        yaw_init_deg: project.sweep.yaw_init_deg.clone(),
        inflow: build_inflow(&project.inflow),
        execution: build_execution(&project.execution),
        layout,
        global,
        axes,
        domain,
        templates,
        scripts,
    };
    inputs.validate()?;
    check_unique_dirs(&cases)?;

    info!(
        sweep = %project.name,
        turbines = inputs.layout.len(),
        cases = cases.len(),
        "sweep prepared"
    );
    Ok(SweepPlan {
        name: project.name,
        inputs,
        cases,
    })
}

pub fn execute_sweep(plan: &SweepPlan, options: &RunOptions) -> AppResult<SweepSummary> {
    let summary = match options.jobs {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| AppError::WorkerPool(e.to_string()))?;
            pool.install(|| run_sweep(&plan.inputs, &plan.cases))?
        }
        None => run_sweep(&plan.inputs, &plan.cases)?,
    };
    Ok(summary)
}

/// Turn a partially failed sweep into an error.
pub fn require_complete(summary: &SweepSummary) -> AppResult<()> {
    if !summary.failed.is_empty() {
        return Err(AppError::IncompleteSweep {
            failed: summary.failed.len(),
            total: summary.total(),
        });
    }
    match &summary.batch_error {
        Some(reason) => Err(AppError::BatchScripts(reason.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_script_failure_makes_the_sweep_incomplete() {
        let summary = SweepSummary {
            batch_error: Some("runAllLowBox.sh: is a directory".to_string()),
            ..SweepSummary::default()
        };
        let err = require_complete(&summary).unwrap_err();
        assert!(matches!(err, AppError::BatchScripts(_)));
        require_complete(&SweepSummary::default()).unwrap();
    }
}
