//! Periodic control loop driving the twin.

use crate::config::TwinConfig;
use crate::error::TwinResult;
use crate::facility::Facility;
use crate::schedule::TickSchedule;
use crate::store::VariableStore;
use crate::tick::run_tick;
use crate::variables;
use lf_branch::BranchKind;
use lf_core::timing::{AccumulatingTimer, Stopwatch};
use lf_core::units::to_kgps;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Register every variable the loop touches, with inputs set from `config`.
///
/// Outputs start as NaN with `solve_valid` at zero until the first tick.
pub async fn seed_inputs<S: VariableStore>(store: &S, config: &TwinConfig) -> TwinResult<()> {
    store
        .write(variables::PUMP_PRESSURE_PA, config.inputs.pump_pressure_pa)
        .await?;
    store
        .write(variables::TEMPERATURE_DEGC, config.inputs.temperature_degc)
        .await?;
    for kind in BranchKind::ALL {
        let open = if config.valves.is_open(kind) { 1.0 } else { 0.0 };
        store.write(variables::valve_open(kind), open).await?;
    }
    for name in variables::outputs() {
        let initial = if name == variables::SOLVE_VALID { 0.0 } else { f64::NAN };
        store.write(name, initial).await?;
    }
    Ok(())
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopSummary {
    pub ticks: u64,
    pub valid_ticks: u64,
    /// Ticks whose solve failed or whose store access failed.
    pub failed_ticks: u64,
    pub overruns: u64,
    pub average_calculation_time_s: f64,
}

pub struct ControlLoop<S> {
    facility: Facility,
    store: S,
    schedule: TickSchedule,
    max_ticks: Option<u64>,
    timer: AccumulatingTimer,
}

impl<S: VariableStore> ControlLoop<S> {
    pub fn new(facility: Facility, store: S, schedule: TickSchedule) -> Self {
        Self {
            facility,
            store,
            schedule,
            max_ticks: None,
            timer: AccumulatingTimer::new(),
        }
    }

    pub fn from_config(config: &TwinConfig, store: S) -> TwinResult<Self> {
        let facility = Facility::from_config(config)?;
        let schedule = TickSchedule::from_secs_f64(config.tick_period_s)?;
        let mut control = Self::new(facility, store, schedule);
        control.max_ticks = config.max_ticks;
        Ok(control)
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    /// Run until `max_ticks` is reached, or forever when unset.
    pub async fn run(&mut self) -> LoopSummary {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until `shutdown` resolves or `max_ticks` is reached.
    ///
    /// Shutdown is only observed between ticks, so a tick in progress always
    /// publishes before the loop stops.
    pub async fn run_until<F>(&mut self, shutdown: F) -> LoopSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = LoopSummary::default();

        info!(
            period_s = self.schedule.period().as_secs_f64(),
            max_ticks = ?self.max_ticks,
            "control loop started"
        );

        loop {
            if self.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            let stopwatch = Stopwatch::start();
            self.step(summary.ticks, &mut summary).await;
            summary.ticks += 1;

            if self.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            let delay = self.schedule.delay_after(stopwatch.elapsed());
            tokio::select! {
                _ = &mut shutdown => {
                    info!(ticks = summary.ticks, "shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        summary.overruns = self.schedule.overruns();
        summary.average_calculation_time_s = self.timer.average_seconds();
        info!(
            ticks = summary.ticks,
            valid = summary.valid_ticks,
            failed = summary.failed_ticks,
            "control loop stopped"
        );
        summary
    }

    async fn step(&mut self, tick: u64, summary: &mut LoopSummary) {
        match run_tick(&self.facility, &self.store, tick).await {
            Ok(report) => {
                self.timer
                    .record(Duration::from_secs_f64(report.calculation_time_s));
                match &report.outcome {
                    Ok(solution) => {
                        summary.valid_ticks += 1;
                        info!(
                            tick,
                            heater_kgps = to_kgps(solution.flow(BranchKind::Heater)),
                            ctah_kgps = to_kgps(solution.flow(BranchKind::Ctah)),
                            dhx_kgps = to_kgps(solution.flow(BranchKind::Dhx)),
                            calculation_time_s = report.calculation_time_s,
                            "tick"
                        );
                    }
                    Err(err) => {
                        summary.failed_ticks += 1;
                        warn!(tick, error = %err, "solve failed, outputs marked invalid");
                    }
                }
            }
            Err(err) => {
                summary.failed_ticks += 1;
                warn!(tick, error = %err, "tick aborted");
                if let Err(err) = self.store.write(variables::SOLVE_VALID, 0.0).await {
                    debug!(tick, error = %err, "could not flag outputs invalid");
                }
            }
        }
    }
}
