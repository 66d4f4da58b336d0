//! Inversion of a branch pressure change to a mass flow rate.

use crate::branch_spec::{BranchSpec, OperatingPoint};
use crate::brent::{BrentConfig, BrentError, brent};
use crate::error::{SolverError, SolverResult};
use lf_branch::CorrelationError;
use lf_core::units::{MassRate, Pressure, kgps, to_pa};

/// How a branch flow was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionPath {
    /// Brent root-find over the branch's flow bracket.
    RootFind { iterations: usize },
    /// Target above the zero-flow pressure change of a check-valved branch.
    CheckValveCutoff,
    /// Branch isolated by its valve.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchInversion {
    pub mass_rate: MassRate,
    pub path: InversionPath,
}

/// Find the mass flow rate at which `spec` produces `target`.
///
/// Fails with [`SolverError::NoBracket`] when `target` is unreachable over
/// the branch's flow bracket. Correlation failures propagate unmodified.
pub fn invert_branch_flow(
    spec: &BranchSpec<'_>,
    target: Pressure,
    op: &OperatingPoint,
    config: &BrentConfig,
) -> SolverResult<BranchInversion> {
    if !spec.open {
        return Ok(BranchInversion {
            mass_rate: kgps(0.0),
            path: InversionPath::Closed,
        });
    }

    let target_pa = to_pa(target);

    let pump = spec.pump_for(op);

    if spec.check_valve {
        // Zero-flow pressure change includes the pump boost on pumped branches.
        let zero_flow = to_pa(
            spec.correlation
                .pressure_change(kgps(0.0), op.temperature, pump)?,
        );
        if target_pa > zero_flow {
            tracing::trace!(
                branch = spec.name(),
                target_pa,
                zero_flow_pa = zero_flow,
                "check valve holds branch at zero flow"
            );
            return Ok(BranchInversion {
                mass_rate: kgps(0.0),
                path: InversionPath::CheckValveCutoff,
            });
        }
    }

    let residual = |mdot: f64| -> Result<f64, CorrelationError> {
        let dp = spec
            .correlation
            .pressure_change(kgps(mdot), op.temperature, pump)?;
        Ok(to_pa(dp) - target_pa)
    };

    let bracket = spec.flow_bracket;
    match brent(residual, bracket.lo, bracket.hi, config) {
        Ok(result) => {
            tracing::trace!(
                branch = spec.name(),
                target_pa,
                mdot = result.x,
                iterations = result.iterations,
                "branch inverted"
            );
            Ok(BranchInversion {
                mass_rate: kgps(result.x),
                path: InversionPath::RootFind {
                    iterations: result.iterations,
                },
            })
        }
        Err(BrentError::NotBracketed { f_lo, f_hi }) => Err(SolverError::NoBracket {
            branch: spec.name().to_string(),
            target_pa,
            lo: bracket.lo,
            hi: bracket.hi,
            residual_lo: f_lo,
            residual_hi: f_hi,
        }),
        Err(BrentError::MaxIterations { last, residual }) => Err(SolverError::ConvergenceFailed {
            what: format!(
                "branch '{}' inversion hit {} iterations at {last} kg/s (residual {residual:.3e} Pa)",
                spec.name(),
                config.max_iterations
            ),
        }),
        Err(BrentError::NonFinite { x }) => Err(SolverError::ConvergenceFailed {
            what: format!("branch '{}' pressure change not finite at {x} kg/s", spec.name()),
        }),
        Err(BrentError::Eval(err)) => Err(err.into()),
    }
}
