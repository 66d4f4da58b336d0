//! One read, solve and publish cycle.

use crate::config::ValveSettings;
use crate::error::TwinResult;
use crate::facility::{Facility, FacilitySolution};
use crate::store::VariableStore;
use crate::variables;
use lf_branch::BranchKind;
use lf_core::timing::Stopwatch;
use lf_core::units::{to_kgps, to_pa};
use lf_solver::{OperatingPoint, SolverError};

/// Store values above this are read as an open valve.
pub const VALVE_OPEN_THRESHOLD: f64 = 0.5;

const ERROR_OUTPUTS: [&str; 4] = [
    variables::FLOWMETER_DEVIATION_PA,
    variables::MANOMETER_ERROR_PA,
    variables::FLDK_ERROR_PA,
    variables::TOTAL_PRESSURE_ERROR_PA,
];

/// Inputs captured at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub operating_point: OperatingPoint,
    pub valves: ValveSettings,
}

impl TickContext {
    pub async fn read<S: VariableStore>(store: &S, tick: u64) -> TwinResult<Self> {
        let pump_pa = store.read(variables::PUMP_PRESSURE_PA).await?;
        let temperature_degc = store.read(variables::TEMPERATURE_DEGC).await?;

        let mut valves = ValveSettings::default();
        for kind in BranchKind::ALL {
            let value = store.read(variables::valve_open(kind)).await?;
            valves.set(kind, value > VALVE_OPEN_THRESHOLD);
        }

        Ok(Self {
            tick,
            operating_point: OperatingPoint::from_si(pump_pa, temperature_degc),
            valves,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub calculation_time_s: f64,
    /// Solver failures are kept here rather than aborting the loop.
    pub outcome: Result<FacilitySolution, SolverError>,
}

impl TickReport {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Read inputs, balance the loop and publish the outputs.
///
/// A solver failure still publishes: the numeric outputs become NaN and
/// `solve_valid` drops to zero. Only store failures are returned as errors.
pub async fn run_tick<S: VariableStore>(
    facility: &Facility,
    store: &S,
    tick: u64,
) -> TwinResult<TickReport> {
    let context = TickContext::read(store, tick).await?;

    let stopwatch = Stopwatch::start();
    let outcome = facility.solve(&context.operating_point, &context.valves);
    let calculation_time_s = stopwatch.elapsed_s();

    let report = TickReport {
        tick,
        calculation_time_s,
        outcome,
    };
    publish(store, &report).await?;
    Ok(report)
}

async fn publish<S: VariableStore>(store: &S, report: &TickReport) -> TwinResult<()> {
    match &report.outcome {
        Ok(solution) => {
            for kind in BranchKind::ALL {
                store
                    .write(variables::mass_flowrate(kind), to_kgps(solution.flow(kind)))
                    .await?;
            }
            store
                .write(
                    variables::COMMON_PRESSURE_CHANGE_PA,
                    to_pa(solution.common_pressure_change()),
                )
                .await?;
            let errors = &solution.errors;
            for (name, value) in [
                (variables::FLOWMETER_DEVIATION_PA, errors.flowmeter),
                (variables::MANOMETER_ERROR_PA, errors.manometer),
                (variables::FLDK_ERROR_PA, errors.fldk),
                (variables::TOTAL_PRESSURE_ERROR_PA, errors.total),
            ] {
                store.write(name, to_pa(value)).await?;
            }
            store.write(variables::SOLVE_VALID, 1.0).await?;
        }
        Err(_) => {
            for kind in BranchKind::ALL {
                store.write(variables::mass_flowrate(kind), f64::NAN).await?;
            }
            store
                .write(variables::COMMON_PRESSURE_CHANGE_PA, f64::NAN)
                .await?;
            for name in ERROR_OUTPUTS {
                store.write(name, f64::NAN).await?;
            }
            store.write(variables::SOLVE_VALID, 0.0).await?;
        }
    }
    store
        .write(variables::CALCULATION_TIME_S, report.calculation_time_s)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TwinConfig;
    use crate::store::MemoryStore;

    fn seeded(pump_pa: f64, temperature_degc: f64) -> MemoryStore {
        let mut values = vec![
            (variables::PUMP_PRESSURE_PA, pump_pa),
            (variables::TEMPERATURE_DEGC, temperature_degc),
        ];
        values.extend(BranchKind::ALL.iter().map(|&k| (variables::valve_open(k), 1.0)));
        MemoryStore::with_values(values)
    }

    #[tokio::test]
    async fn context_reads_valve_threshold() {
        let store = seeded(1000.0, 30.0);
        store
            .write(variables::valve_open(BranchKind::Heater), 0.5)
            .await
            .unwrap();
        let context = TickContext::read(&store, 7).await.unwrap();
        assert_eq!(context.tick, 7);
        assert!(!context.valves.heater);
        assert!(context.valves.ctah && context.valves.dhx);
    }

    #[tokio::test]
    async fn valid_tick_publishes_flows() {
        let facility = Facility::from_config(&TwinConfig::default()).unwrap();
        let store = seeded(10_000.0, 21.0);
        let report = run_tick(&facility, &store, 0).await.unwrap();
        assert!(report.is_valid());

        let values = store.snapshot().await;
        assert_eq!(values[variables::SOLVE_VALID], 1.0);
        assert!(values[variables::mass_flowrate(BranchKind::Ctah)] > 0.0);
        assert!(values[variables::CALCULATION_TIME_S] >= 0.0);
    }

    #[tokio::test]
    async fn valid_tick_publishes_error_budget() {
        let facility = Facility::from_config(&TwinConfig::default()).unwrap();
        let store = seeded(10_000.0, 21.0);
        run_tick(&facility, &store, 0).await.unwrap();

        let values = store.snapshot().await;
        let flowmeter = values[variables::FLOWMETER_DEVIATION_PA];
        let manometer = values[variables::MANOMETER_ERROR_PA];
        let fldk = values[variables::FLDK_ERROR_PA];
        let total = values[variables::TOTAL_PRESSURE_ERROR_PA];
        assert!((manometer - 14.7).abs() < 1e-12);
        assert!(fldk > 0.0);
        let expected = (flowmeter.powi(2) + manometer.powi(2) + fldk.powi(2)).sqrt();
        assert!((total - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_solve_publishes_nan() {
        let facility = Facility::from_config(&TwinConfig::default()).unwrap();
        let store = seeded(10_000.0, 400.0);
        let report = run_tick(&facility, &store, 0).await.unwrap();
        assert!(!report.is_valid());

        let values = store.snapshot().await;
        assert_eq!(values[variables::SOLVE_VALID], 0.0);
        assert!(values[variables::COMMON_PRESSURE_CHANGE_PA].is_nan());
        assert!(values[variables::mass_flowrate(BranchKind::Dhx)].is_nan());
        for name in ERROR_OUTPUTS {
            assert!(values[name].is_nan(), "{name}");
        }
    }

    #[tokio::test]
    async fn missing_input_is_a_store_error() {
        let facility = Facility::from_config(&TwinConfig::default()).unwrap();
        let store = MemoryStore::new();
        assert!(run_tick(&facility, &store, 0).await.is_err());
        assert!(!store.contains(variables::SOLVE_VALID).await);
    }
}
