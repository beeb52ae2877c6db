//! ff-sweep: from domain parameters to a tree of ready-to-run case
//! directories.
//!
//! Contains:
//! - enumerate (cross product of inflow conditions and seeds)
//! - template / templates (token substitution and the per-role file set)
//! - context (resolved sweep inputs and per-case token values)
//! - boxes (TurbSim low/high-resolution box inputs)
//! - jobs (submission scripts)
//! - structure / writer (planning and writing case directories)
//! - runner (parallel execution with per-case failure reporting)

pub mod boxes;
pub mod context;
pub mod enumerate;
pub mod jobs;
pub mod runner;
pub mod structure;
pub mod template;
pub mod templates;
pub mod writer;

pub use boxes::{
    BoxDescriptor, BoxTier, low_box_dir, resolve_seed_values, setup_high_res_box, setup_low_res_box,
};
pub use context::{Execution, InflowSource, ScriptTemplates, SweepInputs};
pub use enumerate::{AxisIndex, Case, InflowCondition, enumerate_cases};
pub use jobs::{JobContext, JobInput, prepare_submission_script};
pub use runner::{CaseFailure, SweepSummary, check_unique_dirs, run_sweep};
pub use structure::{CaseFiles, CasePlan, materialize, materialize_low_box, plan_case};
pub use template::{Template, TokenScope, TokenValues};
pub use templates::{ResolvedTemplate, TemplateFileSet, TemplateRole};
pub use writer::{COMPLETE_MARKER, INCOMPLETE_MARKER};
