use lf_branch::BranchKind;
use lf_twin::variables;
use lf_twin::*;
use std::time::Duration;

fn config_with_pump(pump_pa: f64) -> TwinConfig {
    TwinConfig {
        inputs: InputDefaults {
            pump_pressure_pa: pump_pa,
            temperature_degc: 21.0,
        },
        ..TwinConfig::default()
    }
}

async fn seeded_loop(config: &TwinConfig) -> ControlLoop<MemoryStore> {
    let store = MemoryStore::new();
    seed_inputs(&store, config).await.unwrap();
    ControlLoop::from_config(config, store).unwrap()
}

#[tokio::test]
async fn seeding_registers_every_variable() {
    let config = TwinConfig::default();
    let store = MemoryStore::new();
    seed_inputs(&store, &config).await.unwrap();

    let values = store.snapshot().await;
    for name in variables::outputs() {
        assert!(values.contains_key(name), "missing {name}");
    }
    assert_eq!(values[variables::SOLVE_VALID], 0.0);
    assert!(values[variables::COMMON_PRESSURE_CHANGE_PA].is_nan());
    assert_eq!(values[variables::valve_open(BranchKind::Dhx)], 1.0);
    assert_eq!(values[variables::TEMPERATURE_DEGC], 21.0);
}

#[tokio::test(start_paused = true)]
async fn forced_circulation_publishes_valid_outputs() {
    let config = config_with_pump(10_000.0);
    let mut control = seeded_loop(&config).await.with_max_ticks(3);

    let summary = control.run().await;
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.valid_ticks, 3);
    assert_eq!(summary.failed_ticks, 0);

    let values = control.store().snapshot().await;
    let ctah = values[variables::mass_flowrate(BranchKind::Ctah)];
    let heater = values[variables::mass_flowrate(BranchKind::Heater)];
    let dhx = values[variables::mass_flowrate(BranchKind::Dhx)];
    assert!(ctah > 0.05 && ctah < 0.5, "ctah = {ctah}");
    assert!((ctah + heater + dhx).abs() < 1e-6);
    assert_eq!(dhx, 0.0);
    assert_eq!(values[variables::SOLVE_VALID], 1.0);
    assert!(values[variables::COMMON_PRESSURE_CHANGE_PA].is_finite());
    assert!(values[variables::FLOWMETER_DEVIATION_PA] < 0.0);
    assert!(values[variables::FLDK_ERROR_PA] > 0.0);
    assert!(values[variables::TOTAL_PRESSURE_ERROR_PA] > values[variables::MANOMETER_ERROR_PA]);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_temperature_keeps_loop_running() {
    let mut config = config_with_pump(10_000.0);
    config.inputs.temperature_degc = 250.0;
    let mut control = seeded_loop(&config).await.with_max_ticks(4);

    let summary = control.run().await;
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.valid_ticks, 0);
    assert_eq!(summary.failed_ticks, 4);

    let values = control.store().snapshot().await;
    assert_eq!(values[variables::SOLVE_VALID], 0.0);
    assert!(values[variables::mass_flowrate(BranchKind::Ctah)].is_nan());
    assert!(values[variables::FLOWMETER_DEVIATION_PA].is_nan());
    assert!(values[variables::MANOMETER_ERROR_PA].is_nan());
    assert!(values[variables::FLDK_ERROR_PA].is_nan());
    assert!(values[variables::TOTAL_PRESSURE_ERROR_PA].is_nan());
    assert!(values[variables::CALCULATION_TIME_S] >= 0.0);
}

#[tokio::test]
async fn input_changes_are_picked_up_between_ticks() {
    let config = config_with_pump(5_000.0);
    let store = MemoryStore::new();
    seed_inputs(&store, &config).await.unwrap();
    let facility = Facility::from_config(&config).unwrap();

    let low = run_tick(&facility, &store, 0).await.unwrap();
    store
        .write(variables::PUMP_PRESSURE_PA, 20_000.0)
        .await
        .unwrap();
    let high = run_tick(&facility, &store, 1).await.unwrap();

    let low = low.outcome.unwrap().flow(BranchKind::Ctah);
    let high = high.outcome.unwrap().flow(BranchKind::Ctah);
    assert!(high > low);
}

#[tokio::test(start_paused = true)]
async fn unseeded_store_fails_ticks_without_crashing() {
    let config = TwinConfig::default();
    let mut control = ControlLoop::from_config(&config, MemoryStore::new())
        .unwrap()
        .with_max_ticks(2);

    let summary = control.run().await;
    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.failed_ticks, 2);
    assert_eq!(
        control.store().read(variables::SOLVE_VALID).await.unwrap(),
        0.0
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_between_ticks() {
    let config = TwinConfig::default();
    let mut control = seeded_loop(&config).await;

    let shutdown = tokio::time::sleep(Duration::from_millis(2500));
    let summary = control.run_until(shutdown).await;
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.valid_ticks, 3);
}

#[tokio::test]
async fn closed_dhx_valve_carries_no_flow() {
    let mut config = config_with_pump(8_000.0);
    config.valves.dhx = false;
    let store = MemoryStore::new();
    seed_inputs(&store, &config).await.unwrap();
    let facility = Facility::from_config(&config).unwrap();

    let report = run_tick(&facility, &store, 0).await.unwrap();
    assert!(report.is_valid());
    let values = store.snapshot().await;
    assert_eq!(values[variables::mass_flowrate(BranchKind::Dhx)], 0.0);
    let ctah = values[variables::mass_flowrate(BranchKind::Ctah)];
    let heater = values[variables::mass_flowrate(BranchKind::Heater)];
    assert!((ctah + heater).abs() < 1e-6);
}

#[tokio::test]
async fn single_open_valve_is_invalid() {
    let config = config_with_pump(8_000.0);
    let store = MemoryStore::new();
    seed_inputs(&store, &config).await.unwrap();
    store
        .write(variables::valve_open(BranchKind::Heater), 0.0)
        .await
        .unwrap();
    store
        .write(variables::valve_open(BranchKind::Dhx), 0.0)
        .await
        .unwrap();
    let facility = Facility::from_config(&config).unwrap();

    let report = run_tick(&facility, &store, 0).await.unwrap();
    assert!(!report.is_valid());
    assert_eq!(store.read(variables::SOLVE_VALID).await.unwrap(), 0.0);
}

#[test]
fn config_yaml_roundtrip() {
    let mut config = config_with_pump(12_000.0);
    config.tick_period_s = 0.25;
    config.max_ticks = Some(40);
    config.valves.heater = false;
    config.balance.reference_branch = BranchKind::Ctah;
    config.error_model.fldk_fraction = 0.05;

    let path = std::env::temp_dir().join("lf_twin_config_roundtrip.yaml");
    config.save_yaml(&path).unwrap();
    let loaded = TwinConfig::load_yaml(&path).unwrap();

    assert_eq!(config, loaded);
}
