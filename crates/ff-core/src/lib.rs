//! ff-core: stable foundation for ffsweep.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers + deterministic formatting)
//! - quantize (snapping values onto solver grid lattices)
//! - ids (turbine identifiers)
//! - error (shared error taxonomy)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod quantize;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FfError, FfResult};
pub use ids::*;
pub use numeric::*;
pub use quantize::*;
pub use units::*;
