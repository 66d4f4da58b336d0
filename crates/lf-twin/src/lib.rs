//! lf-twin: digital twin of the three-branch loop.
//!
//! A periodic control loop reads the pump pressure, loop temperature and
//! branch valve positions from a [`VariableStore`], balances the loop with
//! `lf-solver`, and publishes branch flows back to the store. Solver
//! failures never stop the loop: the tick's outputs are marked invalid and
//! the next tick runs on schedule.

pub mod config;
pub mod control_loop;
pub mod error;
pub mod facility;
pub mod schedule;
pub mod store;
pub mod tick;
pub mod variables;

pub use config::{BalanceSettings, InputDefaults, TwinConfig, ValveSettings};
pub use control_loop::{ControlLoop, LoopSummary, seed_inputs};
pub use error::{TwinError, TwinResult};
pub use facility::{Facility, FacilitySolution};
pub use schedule::TickSchedule;
pub use store::{MemoryStore, VariableStore};
pub use tick::{TickContext, TickReport, run_tick};
