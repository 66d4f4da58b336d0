//! Per-solve description of one parallel branch.

use lf_branch::PressureDropCorrelation;
use lf_core::units::{MassRate, Pressure, Temperature, degc, pa};
use serde::{Deserialize, Serialize};

/// Flow direction of a branch relative to the shared node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowSign {
    /// Positive branch flow leaves the shared node.
    Leaving,
    /// Positive branch flow enters the shared node.
    Entering,
}

impl FlowSign {
    pub fn factor(self) -> f64 {
        match self {
            FlowSign::Leaving => 1.0,
            FlowSign::Entering => -1.0,
        }
    }
}

/// Search interval for a branch's mass flow rate (kg/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowBracket {
    pub lo: f64,
    pub hi: f64,
}

impl Default for FlowBracket {
    fn default() -> Self {
        Self { lo: -1.0, hi: 1.0 }
    }
}

impl FlowBracket {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn is_valid(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi
    }
}

/// Boundary conditions for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    /// Pump boost applied to pump-driven branches
    pub pump: Pressure,
    pub temperature: Temperature,
}

impl OperatingPoint {
    pub fn new(pump: Pressure, temperature: Temperature) -> Self {
        Self { pump, temperature }
    }

    /// Pump boost in pascal, temperature in degrees Celsius.
    pub fn from_si(pump_pa: f64, temperature_degc: f64) -> Self {
        Self::new(pa(pump_pa), degc(temperature_degc))
    }
}

/// One branch as seen by the balance solver.
///
/// Borrows its correlation for the duration of a solve.
#[derive(Clone, Copy)]
pub struct BranchSpec<'a> {
    pub correlation: &'a dyn PressureDropCorrelation,
    pub sign: FlowSign,
    pub flow_bracket: FlowBracket,
    /// Receives the operating point's pump boost.
    pub pump_driven: bool,
    /// Reverse flow is blocked by a check valve: targets above the branch's
    /// hydrostatic head give zero flow without root-finding.
    pub check_valve: bool,
    /// Closed branches carry no flow and are left out of the balance.
    pub open: bool,
}

impl<'a> BranchSpec<'a> {
    pub fn new(correlation: &'a dyn PressureDropCorrelation) -> Self {
        Self {
            correlation,
            sign: FlowSign::Leaving,
            flow_bracket: FlowBracket::default(),
            pump_driven: false,
            check_valve: false,
            open: true,
        }
    }

    pub fn with_sign(mut self, sign: FlowSign) -> Self {
        self.sign = sign;
        self
    }

    pub fn with_flow_bracket(mut self, bracket: FlowBracket) -> Self {
        self.flow_bracket = bracket;
        self
    }

    pub fn pump_driven(mut self) -> Self {
        self.pump_driven = true;
        self
    }

    pub fn with_check_valve(mut self) -> Self {
        self.check_valve = true;
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn name(&self) -> &str {
        self.correlation.name()
    }

    /// Pump boost this branch sees at `op`.
    pub fn pump_for(&self, op: &OperatingPoint) -> Pressure {
        if self.pump_driven { op.pump } else { pa(0.0) }
    }

    /// Contribution of `mass_rate` to the net flow at the shared node.
    pub fn signed(&self, mass_rate: MassRate) -> MassRate {
        mass_rate * self.sign.factor()
    }
}

impl std::fmt::Debug for BranchSpec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchSpec")
            .field("name", &self.name())
            .field("sign", &self.sign)
            .field("flow_bracket", &self.flow_bracket)
            .field("pump_driven", &self.pump_driven)
            .field("check_valve", &self.check_valve)
            .field("open", &self.open)
            .finish()
    }
}
