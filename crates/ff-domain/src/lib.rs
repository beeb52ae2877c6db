//! ff-domain: wind farm layout and solver domain sizing.
//!
//! Turns a validated turbine layout plus a handful of global scalars into the
//! low-resolution (farm-wide) and high-resolution (per-turbine) grids that
//! FAST.Farm and TurbSim expect.

pub mod calculator;
pub mod conditions;
pub mod config;
pub mod grid;
pub mod guidance;
pub mod layout;

pub use calculator::{DomainParameters, HighResDomain, LowResDomain, compute_domain_parameters};
pub use conditions::ConditionAxes;
pub use config::{GlobalDomainConfig, WakeModel};
pub use grid::GridBox;
pub use guidance::SizingGuidance;
pub use layout::{Layout, PlacedTurbine, Turbine};
