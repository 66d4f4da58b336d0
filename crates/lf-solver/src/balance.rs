//! Parallel-branch flow balance.
//!
//! Finds the pressure change shared by all open branches at which the signed
//! branch flows sum to zero at the common node. Two nested Brent solves:
//! - outer: shared pressure change over a guard band around the hydrostatic
//!   reference
//! - inner: each branch's pressure change inverted to a flow
//!   ([`invert_branch_flow`])
//!
//! Every solve starts from the same bracket policy; nothing carries over
//! between calls.

use crate::branch_spec::{BranchSpec, FlowSign, OperatingPoint};
use crate::brent::{BrentConfig, BrentError, brent_from_bracket};
use crate::error::{OuterBracketReason, SolverError, SolverResult};
use crate::inversion::{InversionPath, invert_branch_flow};
use lf_core::numeric::{Tolerances, nearly_equal};
use lf_core::units::{MassRate, Pressure, kgps, pa, to_kgps, to_pa};

/// Balance solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BalanceConfig {
    /// Half-width of the outer bracket around the hydrostatic reference.
    pub guard_band: Pressure,
    /// Index of the branch whose hydrostatic head centres the bracket.
    pub reference_branch: usize,
    /// Per-branch flow inversion (`eps` in kg/s and Pa)
    pub inner: BrentConfig,
    /// Shared pressure search (`eps` in Pa and kg/s)
    pub outer: BrentConfig,
    /// Accepted branch pressure mismatch at the solution.
    pub pressure_tolerance: Pressure,
    /// Accepted net flow at the common node.
    pub mass_tolerance: MassRate,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            guard_band: pa(50_000.0),
            reference_branch: 0,
            inner: BrentConfig::default(),
            outer: BrentConfig {
                eps: 1e-9,
                max_iterations: 100,
            },
            pressure_tolerance: pa(1e-3),
            mass_tolerance: kgps(1e-6),
        }
    }
}

/// Flow through one branch at the balanced pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchFlow {
    pub name: String,
    /// Positive along the branch's own flow direction.
    pub mass_rate: MassRate,
    pub sign: FlowSign,
    pub path: InversionPath,
}

impl BranchFlow {
    /// Contribution to the net flow at the common node.
    pub fn signed(&self) -> MassRate {
        self.mass_rate * self.sign.factor()
    }
}

/// Converged balance.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub common_pressure_change: Pressure,
    /// Hydrostatic reference the outer bracket was centred on.
    pub reference_pressure_change: Pressure,
    /// One entry per input branch, in input order.
    pub flows: Vec<BranchFlow>,
    pub outer_iterations: usize,
    /// Net signed flow at the common node.
    pub mass_residual: MassRate,
}

impl SolveResult {
    pub fn flow(&self, name: &str) -> Option<MassRate> {
        self.flows
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.mass_rate)
    }
}

fn validate(
    op: &OperatingPoint,
    branches: &[BranchSpec<'_>],
    config: &BalanceConfig,
) -> SolverResult<()> {
    let setup = |what: String| -> SolverResult<()> { Err(SolverError::ProblemSetup { what }) };

    if branches.len() < 2 {
        return setup(format!(
            "balance needs at least two branches, got {}",
            branches.len()
        ));
    }
    let open = branches.iter().filter(|b| b.open).count();
    if open < 2 {
        return setup(format!("balance needs at least two open branches, got {open}"));
    }
    if config.reference_branch >= branches.len() {
        return setup(format!(
            "reference branch index {} out of range for {} branches",
            config.reference_branch,
            branches.len()
        ));
    }
    let guard = to_pa(config.guard_band);
    if !(guard.is_finite() && guard > 0.0) {
        return setup(format!("guard band must be positive and finite, got {guard} Pa"));
    }
    if !to_pa(op.pump).is_finite() || !op.temperature.value.is_finite() {
        return setup("operating point must be finite".to_string());
    }
    for branch in branches {
        if !branch.flow_bracket.is_valid() {
            return setup(format!(
                "branch '{}' has invalid flow bracket [{}, {}]",
                branch.name(),
                branch.flow_bracket.lo,
                branch.flow_bracket.hi
            ));
        }
    }
    Ok(())
}

/// Signed sum of branch flows at shared pressure change `p_pa`.
fn net_flow(
    op: &OperatingPoint,
    branches: &[BranchSpec<'_>],
    inner: &BrentConfig,
    p_pa: f64,
) -> SolverResult<f64> {
    let mut total = 0.0;
    for branch in branches.iter().filter(|b| b.open) {
        let inv = invert_branch_flow(branch, pa(p_pa), op, inner)?;
        total += to_kgps(branch.signed(inv.mass_rate));
    }
    Ok(total)
}

/// Balance the parallel branches at `op`.
///
/// Closed branches are reported with zero flow. The result satisfies, within
/// the configured tolerances, equal pressure change across every branch that
/// was root-found and zero net signed flow.
pub fn solve_balance(
    op: &OperatingPoint,
    branches: &[BranchSpec<'_>],
    config: &BalanceConfig,
) -> SolverResult<SolveResult> {
    validate(op, branches, config)?;

    let reference = branches[config.reference_branch]
        .correlation
        .hydrostatic_pressure_change(op.temperature)?;
    let ref_pa = to_pa(reference);
    let guard = to_pa(config.guard_band);
    let (lo, hi) = (ref_pa - guard, ref_pa + guard);

    tracing::debug!(
        reference_pa = ref_pa,
        lo_pa = lo,
        hi_pa = hi,
        pump_pa = to_pa(op.pump),
        "balance bracket"
    );

    // An endpoint a branch cannot reach means the guard band does not
    // enclose a physical balance.
    let endpoint = |p_pa: f64| -> SolverResult<f64> {
        net_flow(op, branches, &config.inner, p_pa).map_err(|err| match err {
            SolverError::NoBracket {
                branch, target_pa, ..
            } => SolverError::OuterBracket {
                lo_pa: lo,
                hi_pa: hi,
                reason: OuterBracketReason::BranchUnreachable { branch, target_pa },
            },
            other => other,
        })
    };
    let net_lo = endpoint(lo)?;
    let net_hi = endpoint(hi)?;

    let outer = brent_from_bracket(
        |p_pa| net_flow(op, branches, &config.inner, p_pa),
        (lo, net_lo),
        (hi, net_hi),
        &config.outer,
    )
    .map_err(|err| match err {
        BrentError::NotBracketed { f_lo, f_hi } => SolverError::OuterBracket {
            lo_pa: lo,
            hi_pa: hi,
            reason: OuterBracketReason::NoSignChange {
                residual_lo: f_lo,
                residual_hi: f_hi,
            },
        },
        BrentError::MaxIterations { last, residual } => SolverError::ConvergenceFailed {
            what: format!(
                "outer balance hit {} iterations at {last:.6} Pa (net flow {residual:.3e} kg/s)",
                config.outer.max_iterations
            ),
        },
        BrentError::NonFinite { x } => SolverError::ConvergenceFailed {
            what: format!("net flow not finite at {x} Pa"),
        },
        BrentError::Eval(err) => err,
    })?;

    let common_pa = outer.x;
    let mut flows = Vec::with_capacity(branches.len());
    for branch in branches {
        let inv = invert_branch_flow(branch, pa(common_pa), op, &config.inner)?;
        flows.push(BranchFlow {
            name: branch.name().to_string(),
            mass_rate: inv.mass_rate,
            sign: branch.sign,
            path: inv.path,
        });
    }

    let result = SolveResult {
        common_pressure_change: pa(common_pa),
        reference_pressure_change: reference,
        mass_residual: kgps(flows.iter().map(|f| to_kgps(f.signed())).sum()),
        flows,
        outer_iterations: outer.iterations,
    };
    verify(op, branches, config, &result)?;

    tracing::debug!(
        common_pa,
        iterations = result.outer_iterations,
        net_flow = to_kgps(result.mass_residual),
        "balance converged"
    );

    Ok(result)
}

/// Check both balance conditions before a result is reported.
fn verify(
    op: &OperatingPoint,
    branches: &[BranchSpec<'_>],
    config: &BalanceConfig,
    result: &SolveResult,
) -> SolverResult<()> {
    let net = to_kgps(result.mass_residual);
    if net.abs() > to_kgps(config.mass_tolerance) {
        return Err(SolverError::ConvergenceFailed {
            what: format!("net flow {net:.3e} kg/s exceeds mass tolerance"),
        });
    }

    let common = to_pa(result.common_pressure_change);
    for (branch, flow) in branches.iter().zip(&result.flows) {
        if !matches!(flow.path, InversionPath::RootFind { .. }) {
            continue;
        }
        let dp = branch
            .correlation
            .pressure_change(flow.mass_rate, op.temperature, branch.pump_for(op))?;
        let tol = Tolerances {
            abs: to_pa(config.pressure_tolerance),
            rel: 1e-12,
        };
        if !nearly_equal(to_pa(dp), common, tol) {
            let mismatch = to_pa(dp) - common;
            return Err(SolverError::ConvergenceFailed {
                what: format!(
                    "branch '{}' pressure change off by {mismatch:.3e} Pa",
                    flow.name
                ),
            });
        }
    }
    Ok(())
}
