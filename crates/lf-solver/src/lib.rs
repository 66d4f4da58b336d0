//! Parallel-branch flow balance solver.
//!
//! The unknown is the pressure change shared by all parallel branches. For
//! each candidate, every branch's pressure-change correlation is inverted to
//! a mass flow rate, and the candidate is adjusted until the signed flows sum
//! to zero at the common node. Both levels use a bracketed Brent solve.

pub mod balance;
pub mod branch_spec;
pub mod brent;
pub mod error;
pub mod inversion;
pub mod sensitivity;

pub use balance::{BalanceConfig, BranchFlow, SolveResult, solve_balance};
pub use branch_spec::{BranchSpec, FlowBracket, FlowSign, OperatingPoint};
pub use brent::{BrentConfig, BrentResult};
pub use error::{OuterBracketReason, SolverError, SolverResult};
pub use inversion::{BranchInversion, InversionPath, invert_branch_flow};
pub use sensitivity::{
    ErrorModel, MANOMETER_READING_ERROR_PA, PressureErrorBudget, fldk_pressure_error,
    flowmeter_pressure_deviation, pressure_error_budget,
};
