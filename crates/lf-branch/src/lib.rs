//! lf-branch: branch pressure-drop models for loopflow.
//!
//! The balance solver only sees [`PressureDropCorrelation`]. This crate
//! provides that trait plus a reference provider:
//! - Therminol VP-1 liquid properties
//! - Churchill friction factor
//! - pipe, fitting and check-valve segments
//! - series branches and the reference loop geometry

pub mod branch;
pub mod common;
pub mod correlation;
pub mod error;
pub mod fluid;
pub mod friction;
pub mod reference_loop;
pub mod segment;

pub use branch::{BranchKind, SeriesBranch};
pub use correlation::{FnCorrelation, PressureDropCorrelation};
pub use error::{CorrelationError, CorrelationResult};
pub use reference_loop::LoopGeometry;
pub use segment::{Segment, SegmentKind};
