//! lf-core: stable foundation for loopflow.
//!
//! Contains:
//! - units (uom SI types + constructors, Celsius helpers)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - timing (wall-clock measurement for control-loop ticks)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{LfError, LfResult};
pub use numeric::*;
pub use units::*;
