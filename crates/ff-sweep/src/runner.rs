//! Parallel sweep execution.
//!
//! Cases share nothing but read-only inputs, so they are materialized on the
//! rayon pool of the caller. Shared low-resolution boxes are written first.
//! A failed case is reported and the rest still run.

use crate::boxes::{self, BoxTier};
use crate::context::{InflowSource, SweepInputs};
use crate::enumerate::Case;
use crate::jobs;
use crate::structure::{CaseFiles, materialize, materialize_low_box};
use ff_core::{FfError, FfResult};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub struct CaseFailure {
    pub case_index: usize,
    pub dir: PathBuf,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    /// Ordered by case index.
    pub completed: Vec<CaseFiles>,
    pub failed: Vec<CaseFailure>,
    /// Shared low-resolution box inputs, relative to the base path.
    pub low_boxes: Vec<PathBuf>,
    pub batch_scripts: Vec<PathBuf>,
    /// Why the TurbSim batch scripts could not be written.
    pub batch_error: Option<String>,
}

impl SweepSummary {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.batch_error.is_none()
    }
}

/// Distinct cases must never share a directory.
pub fn check_unique_dirs(cases: &[Case]) -> FfResult<()> {
    let mut seen: BTreeMap<PathBuf, usize> = BTreeMap::new();
    for case in cases {
        if let Some(other) = seen.insert(case.relative_dir(), case.index) {
            return Err(FfError::write(
                case.relative_dir(),
                format!("cases {other} and {} map to the same directory", case.index),
            ));
        }
    }
    Ok(())
}

struct LowBoxes {
    /// Input path relative to the base path, keyed by box directory.
    written: BTreeMap<PathBuf, PathBuf>,
    failed: BTreeMap<PathBuf, (&'static str, String)>,
}

fn materialize_low_boxes(inputs: &SweepInputs, cases: &[Case]) -> LowBoxes {
    let mut shared: BTreeMap<PathBuf, &Case> = BTreeMap::new();
    if inputs.inflow == InflowSource::TurbSim {
        for case in cases {
            shared.entry(boxes::low_box_dir(case)).or_insert(case);
        }
    }
    let shared: Vec<(PathBuf, &Case)> = shared.into_iter().collect();
    let results: Vec<(PathBuf, FfResult<PathBuf>)> = shared
        .into_par_iter()
        .map(|(dir, case)| {
            let result = materialize_low_box(case, inputs).map(|b| b.base_relative_path());
            (dir, result)
        })
        .collect();

    let mut low = LowBoxes {
        written: BTreeMap::new(),
        failed: BTreeMap::new(),
    };
    for (dir, result) in results {
        match result {
            Ok(path) => {
                low.written.insert(dir, path);
            }
            Err(e) => {
                error!(low_box = %dir.display(), kind = e.kind(), "low-resolution box failed: {e}");
                low.failed.insert(dir, (e.kind(), e.to_string()));
            }
        }
    }
    low
}

pub fn run_sweep(inputs: &SweepInputs, cases: &[Case]) -> FfResult<SweepSummary> {
    inputs.validate()?;
    check_unique_dirs(cases)?;
    info!(cases = cases.len(), base = %inputs.base_path.display(), "materializing sweep");

    let low = materialize_low_boxes(inputs, cases);
    let results: Vec<(&Case, Result<CaseFiles, CaseFailure>)> = cases
        .par_iter()
        .map(|case| {
            let failure = |kind, message| CaseFailure {
                case_index: case.index,
                dir: inputs.case_dir(case),
                kind,
                message,
            };
            let result = match low.failed.get(&boxes::low_box_dir(case)) {
                Some((kind, message)) => {
                    Err(failure(*kind, format!("shared low-resolution box failed: {message}")))
                }
                None => materialize(case, inputs).map_err(|e| failure(e.kind(), e.to_string())),
            };
            (case, result)
        })
        .collect();

    let mut summary = SweepSummary::default();
    for (case, result) in results {
        match result {
            Ok(files) => summary.completed.push(files),
            Err(failure) => {
                error!(
                    case = %case.job_name(),
                    kind = failure.kind,
                    "case failed: {}",
                    failure.message
                );
                summary.failed.push(failure);
            }
        }
    }

    let mut used_low = BTreeSet::new();
    let mut high = Vec::new();
    for b in summary.completed.iter().flat_map(|done| &done.boxes) {
        match b.tier {
            BoxTier::Low => {
                used_low.insert(b.dir.clone());
            }
            BoxTier::High(_) => high.push(b.base_relative_path().display().to_string()),
        }
    }
    let low_inputs = low
        .written
        .iter()
        .filter(|(dir, _)| used_low.contains(*dir))
        .map(|(_, path)| path.display().to_string())
        .collect();
    summary.low_boxes = low.written.into_values().collect();

    if inputs.inflow == InflowSource::TurbSim && !summary.completed.is_empty() {
        match jobs::write_batch_scripts(inputs, low_inputs, high) {
            Ok(scripts) => summary.batch_scripts = scripts,
            Err(e) => {
                error!(kind = e.kind(), "batch scripts failed: {e}");
                summary.batch_error = Some(e.to_string());
            }
        }
    }

    info!(
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        low_boxes = summary.low_boxes.len(),
        "sweep finished"
    );
    Ok(summary)
}
