//! The three-branch loop assembled for the balance solver.

use crate::config::{BalanceSettings, TwinConfig, ValveSettings};
use crate::error::TwinResult;
use lf_branch::{BranchKind, LoopGeometry};
use lf_core::units::{MassRate, Pressure, kgps};
use lf_solver::{
    BalanceConfig, BranchSpec, ErrorModel, OperatingPoint, PressureErrorBudget, SolveResult,
    SolverResult, pressure_error_budget, solve_balance,
};

/// Loop geometry plus the solver settings used every tick.
#[derive(Debug, Clone)]
pub struct Facility {
    geometry: LoopGeometry,
    settings: BalanceSettings,
    balance: BalanceConfig,
    error_model: ErrorModel,
}

/// Balanced loop state for one operating point.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySolution {
    /// Branch flows in [`BranchKind::ALL`] order.
    pub result: SolveResult,
    /// Pressure error estimates for the CTAH and heater loop.
    pub errors: PressureErrorBudget,
}

impl FacilitySolution {
    pub fn flow(&self, kind: BranchKind) -> MassRate {
        self.result
            .flows
            .get(index_of(kind))
            .map_or(kgps(0.0), |f| f.mass_rate)
    }

    pub fn common_pressure_change(&self) -> Pressure {
        self.result.common_pressure_change
    }
}

impl Facility {
    pub fn new(geometry: LoopGeometry, settings: BalanceSettings, error_model: ErrorModel) -> Self {
        let balance = settings.balance_config();
        Self {
            geometry,
            settings,
            balance,
            error_model,
        }
    }

    pub fn from_config(config: &TwinConfig) -> TwinResult<Self> {
        config.validate()?;
        Ok(Self::new(
            config.loop_geometry.clone(),
            config.balance.clone(),
            config.error_model,
        ))
    }

    pub fn geometry(&self) -> &LoopGeometry {
        &self.geometry
    }

    /// Solver view of the loop, one spec per branch in [`BranchKind::ALL`] order.
    pub fn specs(&self, valves: &ValveSettings) -> Vec<BranchSpec<'_>> {
        BranchKind::ALL
            .iter()
            .map(|&kind| {
                let branch = self.geometry.branch(kind);
                let mut spec = BranchSpec::new(branch)
                    .with_flow_bracket(self.settings.flow_bracket_kgps)
                    .with_open(valves.is_open(kind));
                if branch.pump_driven {
                    spec = spec.pump_driven();
                }
                if self.settings.check_valve_fast_path && branch.has_check_valve() {
                    spec = spec.with_check_valve();
                }
                spec
            })
            .collect()
    }

    /// Balance the loop at `op` with the given valve line-up.
    pub fn solve(
        &self,
        op: &OperatingPoint,
        valves: &ValveSettings,
    ) -> SolverResult<FacilitySolution> {
        let specs = self.specs(valves);
        let result = solve_balance(op, &specs, &self.balance)?;

        let ctah = index_of(BranchKind::Ctah);
        let heater = index_of(BranchKind::Heater);
        let errors = pressure_error_budget(
            &specs[ctah],
            &specs[heater],
            result.flows[ctah].mass_rate,
            op,
            &self.error_model,
        )?;

        Ok(FacilitySolution { result, errors })
    }
}

fn index_of(kind: BranchKind) -> usize {
    match kind {
        BranchKind::Heater => 0,
        BranchKind::Ctah => 1,
        BranchKind::Dhx => 2,
    }
}
