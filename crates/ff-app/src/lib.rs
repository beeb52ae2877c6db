//! Shared application service layer for ffsweep.
//!
//! Loads and validates sweep files, compiles them into domain and sweep
//! inputs, and runs the sweep. Frontends only talk to this crate.

pub mod error;
pub mod project_service;
pub mod run_service;
pub mod starter;
pub mod sweep_compile;

pub use error::{AppError, AppResult};
pub use project_service::{load_project, save_project, validate_project};
pub use run_service::{
    RunOptions, SweepPlan, compute_domain, execute_sweep, prepare_sweep, require_complete,
};
pub use starter::{SWEEP_FILE, write_starter};
