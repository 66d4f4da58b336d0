//! Variable names exchanged with the variable store.
//!
//! Inputs are written by operators or upstream systems and read at the start
//! of every tick. Outputs are written once per tick after the solve.

use lf_branch::BranchKind;

pub const PUMP_PRESSURE_PA: &str = "ctah_pump_pressure_pa";
pub const TEMPERATURE_DEGC: &str = "loop_temperature_degc";

pub const COMMON_PRESSURE_CHANGE_PA: &str = "common_pressure_change_pa";
pub const CALCULATION_TIME_S: &str = "calculation_time_s";
pub const FLOWMETER_DEVIATION_PA: &str = "ctah_flowmeter_deviation_pa";
pub const MANOMETER_ERROR_PA: &str = "manometer_reading_error_pa";
pub const FLDK_ERROR_PA: &str = "loop_fldk_error_pa";
pub const TOTAL_PRESSURE_ERROR_PA: &str = "loop_total_pressure_error_pa";
/// 1.0 when the tick's outputs come from a converged solve, 0.0 otherwise.
pub const SOLVE_VALID: &str = "solve_valid";

/// Valve flag for a branch: values above 0.5 mean open.
pub fn valve_open(kind: BranchKind) -> &'static str {
    match kind {
        BranchKind::Heater => "heater_branch_valve_open",
        BranchKind::Ctah => "ctah_branch_valve_open",
        BranchKind::Dhx => "dhx_branch_valve_open",
    }
}

pub fn mass_flowrate(kind: BranchKind) -> &'static str {
    match kind {
        BranchKind::Heater => "heater_branch_flowrate_kgps",
        BranchKind::Ctah => "ctah_branch_flowrate_kgps",
        BranchKind::Dhx => "dhx_branch_flowrate_kgps",
    }
}

/// Every output written by a tick.
pub fn outputs() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BranchKind::ALL.iter().map(|&k| mass_flowrate(k)).collect();
    names.extend([
        COMMON_PRESSURE_CHANGE_PA,
        FLOWMETER_DEVIATION_PA,
        MANOMETER_ERROR_PA,
        FLDK_ERROR_PA,
        TOTAL_PRESSURE_ERROR_PA,
        CALCULATION_TIME_S,
        SOLVE_VALID,
    ]);
    names
}
