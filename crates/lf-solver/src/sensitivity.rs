//! Loop pressure-drop error estimates.
//!
//! Three independent sources are combined in quadrature: the flowmeter
//! reading, the manometer reading and the fLDK correlations of the
//! empirically characterised components.

use crate::branch_spec::{BranchSpec, OperatingPoint};
use crate::error::{SolverError, SolverResult};
use lf_core::units::{MassRate, Pressure, kgps, pa, to_kgps, to_pa};
use serde::{Deserialize, Serialize};

/// Flows at or below this magnitude give a negligible deviation (kg/s).
pub const NEGLIGIBLE_FLOW_KGPS: f64 = 4e-4;

/// Manometer reading error (Pa): 1 mm on each of two legs, root-sum-square.
pub const MANOMETER_READING_ERROR_PA: f64 = 14.7;

/// Fractional and absolute measurement errors feeding the error budget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorModel {
    /// Relative flowmeter error.
    pub flowmeter_fraction: f64,
    /// Relative error of each empirical fLDK correlation.
    pub fldk_fraction: f64,
    /// Manometer reading error (Pa).
    pub manometer_pa: f64,
}

impl Default for ErrorModel {
    fn default() -> Self {
        Self {
            flowmeter_fraction: 0.02,
            fldk_fraction: 0.10,
            manometer_pa: MANOMETER_READING_ERROR_PA,
        }
    }
}

/// Loop pressure-drop error contributions, all in pascal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureErrorBudget {
    /// Signed deviation from the flowmeter error.
    pub flowmeter: Pressure,
    pub manometer: Pressure,
    /// Root-sum-square of the correlated component errors in both branches.
    pub fldk: Pressure,
    /// Root-sum-square of the three contributions.
    pub total: Pressure,
}

fn check_fraction(value: f64, what: &str) -> SolverResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SolverError::ProblemSetup {
            what: format!("{what} must be positive, got {value}"),
        })
    }
}

/// Pressure change around the loop formed by `forward` and `ret`, with
/// `mdot` running down `forward` and back up `ret`.
fn loop_pressure_change(
    forward: &BranchSpec<'_>,
    ret: &BranchSpec<'_>,
    mdot: f64,
    op: &OperatingPoint,
) -> SolverResult<f64> {
    let down = forward
        .correlation
        .pressure_change(kgps(mdot), op.temperature, forward.pump_for(op))?;
    let up = ret
        .correlation
        .pressure_change(kgps(-mdot), op.temperature, ret.pump_for(op))?;
    Ok(to_pa(down) - to_pa(up))
}

/// Estimate the loop pressure deviation from a fractional flowmeter error.
///
/// Central difference of the loop pressure change over
/// `mdot * (1 ± error_fraction)`, scaled by the flow error.
pub fn flowmeter_pressure_deviation(
    forward: &BranchSpec<'_>,
    ret: &BranchSpec<'_>,
    mdot: MassRate,
    op: &OperatingPoint,
    error_fraction: f64,
) -> SolverResult<Pressure> {
    check_fraction(error_fraction, "flowmeter error fraction")?;

    let x = to_kgps(mdot);
    if x.abs() <= NEGLIGIBLE_FLOW_KGPS {
        return Ok(pa(0.0));
    }

    let dx = x * error_fraction;
    let upper = loop_pressure_change(forward, ret, x + dx, op)?;
    let lower = loop_pressure_change(forward, ret, x - dx, op)?;
    let gradient = (upper - lower) / (2.0 * dx);

    Ok(pa(dx * gradient))
}

/// Pressure error of one branch from a fractional error in each of its
/// correlated components, combined root-sum-square.
pub fn fldk_pressure_error(
    spec: &BranchSpec<'_>,
    mdot: MassRate,
    op: &OperatingPoint,
    fraction: f64,
) -> SolverResult<Pressure> {
    check_fraction(fraction, "fLDK error fraction")?;
    let losses = spec.correlation.correlated_losses(mdot, op.temperature)?;
    let sum_sq: f64 = losses
        .iter()
        .map(|loss| (fraction * to_pa(*loss)).powi(2))
        .sum();
    Ok(pa(sum_sq.sqrt()))
}

/// Full loop pressure-drop error budget for `mdot` running down `forward`
/// and back up `ret`.
pub fn pressure_error_budget(
    forward: &BranchSpec<'_>,
    ret: &BranchSpec<'_>,
    mdot: MassRate,
    op: &OperatingPoint,
    model: &ErrorModel,
) -> SolverResult<PressureErrorBudget> {
    if !(model.manometer_pa.is_finite() && model.manometer_pa >= 0.0) {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "manometer error must be non-negative, got {}",
                model.manometer_pa
            ),
        });
    }

    let flowmeter = flowmeter_pressure_deviation(forward, ret, mdot, op, model.flowmeter_fraction)?;
    let down = to_pa(fldk_pressure_error(forward, mdot, op, model.fldk_fraction)?);
    let up = to_pa(fldk_pressure_error(ret, -mdot, op, model.fldk_fraction)?);
    let fldk = down.hypot(up);
    let total = (to_pa(flowmeter).powi(2) + model.manometer_pa.powi(2) + fldk.powi(2)).sqrt();

    Ok(PressureErrorBudget {
        flowmeter,
        manometer: pa(model.manometer_pa),
        fldk: pa(fldk),
        total: pa(total),
    })
}
