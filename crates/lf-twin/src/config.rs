//! Twin configuration file (YAML).

use crate::error::{TwinError, TwinResult};
use lf_branch::{BranchKind, LoopGeometry};
use lf_core::units::{kgps, pa};
use lf_solver::{BalanceConfig, BrentConfig, ErrorModel, FlowBracket};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_tick_period_s() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinConfig {
    #[serde(default = "default_tick_period_s")]
    pub tick_period_s: f64,
    /// Stop after this many ticks; run until interrupted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,
    #[serde(default)]
    pub balance: BalanceSettings,
    #[serde(default)]
    pub inputs: InputDefaults,
    #[serde(default)]
    pub valves: ValveSettings,
    /// Measurement errors behind the published pressure error budget.
    #[serde(default)]
    pub error_model: ErrorModel,
    #[serde(default)]
    pub loop_geometry: LoopGeometry,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            tick_period_s: default_tick_period_s(),
            max_ticks: None,
            balance: BalanceSettings::default(),
            inputs: InputDefaults::default(),
            valves: ValveSettings::default(),
            error_model: ErrorModel::default(),
            loop_geometry: LoopGeometry::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSettings {
    pub guard_band_pa: f64,
    /// Branch whose hydrostatic head centres the pressure search.
    pub reference_branch: BranchKind,
    pub flow_bracket_kgps: FlowBracket,
    /// Skip the root-find for check-valved branches when the valve must be shut.
    pub check_valve_fast_path: bool,
    pub inner: BrentConfig,
    pub outer: BrentConfig,
    pub pressure_tolerance_pa: f64,
    pub mass_tolerance_kgps: f64,
}

impl Default for BalanceSettings {
    fn default() -> Self {
        let solver = BalanceConfig::default();
        Self {
            guard_band_pa: 50_000.0,
            reference_branch: BranchKind::Heater,
            flow_bracket_kgps: FlowBracket::default(),
            check_valve_fast_path: true,
            inner: solver.inner,
            outer: solver.outer,
            pressure_tolerance_pa: 1e-3,
            mass_tolerance_kgps: 1e-6,
        }
    }
}

impl BalanceSettings {
    /// Solver configuration for branches ordered as [`BranchKind::ALL`].
    pub fn balance_config(&self) -> BalanceConfig {
        let reference_branch = BranchKind::ALL
            .iter()
            .position(|&k| k == self.reference_branch)
            .unwrap_or(0);
        BalanceConfig {
            guard_band: pa(self.guard_band_pa),
            reference_branch,
            inner: self.inner,
            outer: self.outer,
            pressure_tolerance: pa(self.pressure_tolerance_pa),
            mass_tolerance: kgps(self.mass_tolerance_kgps),
        }
    }
}

/// Initial input values written to the store before the first tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub pump_pressure_pa: f64,
    pub temperature_degc: f64,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            pump_pressure_pa: 0.0,
            temperature_degc: 21.0,
        }
    }
}

/// Initial branch isolation valve positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValveSettings {
    #[serde(default = "default_true")]
    pub heater: bool,
    #[serde(default = "default_true")]
    pub ctah: bool,
    #[serde(default = "default_true")]
    pub dhx: bool,
}

impl Default for ValveSettings {
    fn default() -> Self {
        Self {
            heater: true,
            ctah: true,
            dhx: true,
        }
    }
}

impl ValveSettings {
    pub fn is_open(&self, kind: BranchKind) -> bool {
        match kind {
            BranchKind::Heater => self.heater,
            BranchKind::Ctah => self.ctah,
            BranchKind::Dhx => self.dhx,
        }
    }

    pub fn set(&mut self, kind: BranchKind, open: bool) {
        match kind {
            BranchKind::Heater => self.heater = open,
            BranchKind::Ctah => self.ctah = open,
            BranchKind::Dhx => self.dhx = open,
        }
    }

    pub fn open_count(&self) -> usize {
        BranchKind::ALL.iter().filter(|&&k| self.is_open(k)).count()
    }
}

fn positive_finite(value: f64, what: &str) -> TwinResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TwinError::Config(format!(
            "{what} must be positive and finite, got {value}"
        )))
    }
}

fn check_brent(config: &BrentConfig, what: &str) -> TwinResult<()> {
    positive_finite(config.eps, &format!("{what}.eps"))?;
    if config.max_iterations == 0 {
        return Err(TwinError::Config(format!(
            "{what} max_iterations must be at least 1"
        )));
    }
    Ok(())
}

impl TwinConfig {
    pub fn validate(&self) -> TwinResult<()> {
        positive_finite(self.tick_period_s, "tick_period_s")?;
        positive_finite(
            self.error_model.flowmeter_fraction,
            "error_model.flowmeter_fraction",
        )?;
        positive_finite(self.error_model.fldk_fraction, "error_model.fldk_fraction")?;
        let manometer = self.error_model.manometer_pa;
        if !(manometer.is_finite() && manometer >= 0.0) {
            return Err(TwinError::Config(format!(
                "error_model.manometer_pa must be non-negative and finite, got {manometer}"
            )));
        }

        let balance = &self.balance;
        positive_finite(balance.guard_band_pa, "balance.guard_band_pa")?;
        positive_finite(balance.pressure_tolerance_pa, "balance.pressure_tolerance_pa")?;
        positive_finite(balance.mass_tolerance_kgps, "balance.mass_tolerance_kgps")?;
        if !balance.flow_bracket_kgps.is_valid() {
            return Err(TwinError::Config(format!(
                "balance.flow_bracket_kgps [{}, {}] must be finite with lo < hi",
                balance.flow_bracket_kgps.lo, balance.flow_bracket_kgps.hi
            )));
        }
        check_brent(&balance.inner, "balance.inner")?;
        check_brent(&balance.outer, "balance.outer")?;

        if !self.inputs.pump_pressure_pa.is_finite() || !self.inputs.temperature_degc.is_finite()
        {
            return Err(TwinError::Config("inputs must be finite".to_string()));
        }
        if self.valves.open_count() < 2 {
            return Err(TwinError::Config(
                "at least two branch valves must start open".to_string(),
            ));
        }

        self.loop_geometry.validate()?;
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> TwinResult<Self> {
        let config: TwinConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> TwinResult<String> {
        self.validate()?;
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load_yaml(path: &Path) -> TwinResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TwinError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn save_yaml(&self, path: &Path) -> TwinResult<()> {
        let content = self.to_yaml_string()?;
        std::fs::write(path, content).map_err(|source| TwinError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
