use clap::{Parser, Subcommand};
use lf_branch::BranchKind;
use lf_core::units::{to_kgps, to_pa};
use lf_solver::{InversionPath, OperatingPoint, SolverError};
use lf_twin::{ControlLoop, Facility, FacilitySolution, MemoryStore, TwinConfig, TwinError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Twin(#[from] TwinError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid arguments: {0}")]
    Args(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "loopflow")]
#[command(about = "loopflow - parallel-branch flow balance and loop digital twin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Balance the loop once at a single operating point
    Solve {
        /// CTAH pump boost pressure (Pa)
        #[arg(long, allow_hyphen_values = true)]
        pump_pa: f64,
        /// Loop temperature (°C)
        #[arg(long, default_value_t = 21.0)]
        temperature_c: f64,
        /// Twin configuration YAML (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Balance the loop over a range of pump pressures
    Sweep {
        #[arg(long, allow_hyphen_values = true)]
        from_pa: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_pa: f64,
        /// Number of points, endpoints included
        #[arg(long, default_value_t = 11)]
        steps: usize,
        #[arg(long, default_value_t = 21.0)]
        temperature_c: f64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the control loop against an in-memory variable store
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many ticks (overrides the config file)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Write the default configuration to a YAML file
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            pump_pa,
            temperature_c,
            config,
            json,
        } => cmd_solve(pump_pa, temperature_c, config.as_deref(), json),
        Commands::Sweep {
            from_pa,
            to_pa,
            steps,
            temperature_c,
            config,
        } => cmd_sweep(from_pa, to_pa, steps, temperature_c, config.as_deref()),
        Commands::Serve { config, ticks } => cmd_serve(config.as_deref(), ticks).await,
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<TwinConfig> {
    match path {
        Some(path) => Ok(TwinConfig::load_yaml(path)?),
        None => Ok(TwinConfig::default()),
    }
}

#[derive(Serialize)]
struct BranchReport {
    branch: &'static str,
    mass_flowrate_kgps: f64,
    path: String,
}

#[derive(Serialize)]
struct SolveReport {
    pump_pressure_pa: f64,
    temperature_degc: f64,
    common_pressure_change_pa: f64,
    reference_pressure_change_pa: f64,
    flowmeter_deviation_pa: f64,
    manometer_error_pa: f64,
    fldk_error_pa: f64,
    total_pressure_error_pa: f64,
    outer_iterations: usize,
    mass_residual_kgps: f64,
    branches: Vec<BranchReport>,
}

fn path_label(path: InversionPath) -> String {
    match path {
        InversionPath::RootFind { iterations } => format!("root-find ({iterations} iterations)"),
        InversionPath::CheckValveCutoff => "check valve shut".to_string(),
        InversionPath::Closed => "valve closed".to_string(),
    }
}

fn report(pump_pa: f64, temperature_c: f64, solution: &FacilitySolution) -> SolveReport {
    let result = &solution.result;
    let branches = BranchKind::ALL
        .iter()
        .zip(&result.flows)
        .map(|(kind, flow)| BranchReport {
            branch: kind.as_str(),
            mass_flowrate_kgps: to_kgps(flow.mass_rate),
            path: path_label(flow.path),
        })
        .collect();
    SolveReport {
        pump_pressure_pa: pump_pa,
        temperature_degc: temperature_c,
        common_pressure_change_pa: to_pa(result.common_pressure_change),
        reference_pressure_change_pa: to_pa(result.reference_pressure_change),
        flowmeter_deviation_pa: to_pa(solution.errors.flowmeter),
        manometer_error_pa: to_pa(solution.errors.manometer),
        fldk_error_pa: to_pa(solution.errors.fldk),
        total_pressure_error_pa: to_pa(solution.errors.total),
        outer_iterations: result.outer_iterations,
        mass_residual_kgps: to_kgps(result.mass_residual),
        branches,
    }
}

fn cmd_solve(
    pump_pa: f64,
    temperature_c: f64,
    config_path: Option<&Path>,
    json: bool,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let facility = Facility::from_config(&config)?;
    let op = OperatingPoint::from_si(pump_pa, temperature_c);
    let solution = facility.solve(&op, &config.valves)?;
    let report = report(pump_pa, temperature_c, &solution);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Balanced at pump = {:.1} Pa, T = {:.1} °C",
        report.pump_pressure_pa, report.temperature_degc
    );
    println!(
        "  Common pressure change: {:.3} Pa (hydrostatic reference {:.3} Pa)",
        report.common_pressure_change_pa, report.reference_pressure_change_pa
    );
    for branch in &report.branches {
        println!(
            "  {:<7} {:>12.6} kg/s  [{}]",
            branch.branch, branch.mass_flowrate_kgps, branch.path
        );
    }
    println!(
        "  Pressure error: {:.3} Pa total (flowmeter {:.3}, manometer {:.3}, fLDK {:.3})",
        report.total_pressure_error_pa,
        report.flowmeter_deviation_pa,
        report.manometer_error_pa,
        report.fldk_error_pa
    );
    println!(
        "  Outer iterations: {}, mass residual: {:.3e} kg/s",
        report.outer_iterations, report.mass_residual_kgps
    );
    Ok(())
}

fn cmd_sweep(
    from_pa: f64,
    to_pa_end: f64,
    steps: usize,
    temperature_c: f64,
    config_path: Option<&Path>,
) -> CliResult<()> {
    if steps < 2 {
        return Err(CliError::Args(format!(
            "sweep needs at least 2 steps, got {steps}"
        )));
    }
    let config = load_config(config_path)?;
    let facility = Facility::from_config(&config)?;

    println!(
        "{:>12} {:>12} {:>12} {:>12} {:>14}",
        "pump_pa", "heater_kgps", "ctah_kgps", "dhx_kgps", "dp_common_pa"
    );
    for i in 0..steps {
        let pump_pa = from_pa + (to_pa_end - from_pa) * i as f64 / (steps - 1) as f64;
        let op = OperatingPoint::from_si(pump_pa, temperature_c);
        match facility.solve(&op, &config.valves) {
            Ok(solution) => println!(
                "{:>12.1} {:>12.6} {:>12.6} {:>12.6} {:>14.3}",
                pump_pa,
                to_kgps(solution.flow(BranchKind::Heater)),
                to_kgps(solution.flow(BranchKind::Ctah)),
                to_kgps(solution.flow(BranchKind::Dhx)),
                to_pa(solution.common_pressure_change()),
            ),
            Err(err) => println!("{:>12.1}  invalid: {}", pump_pa, err),
        }
    }
    Ok(())
}

async fn cmd_serve(config_path: Option<&Path>, ticks: Option<u64>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = MemoryStore::new();
    lf_twin::seed_inputs(&store, &config).await?;

    let mut control = ControlLoop::from_config(&config, store)?;
    if let Some(ticks) = ticks {
        control = control.with_max_ticks(ticks);
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let summary = control.run_until(shutdown).await;

    println!(
        "✓ {} ticks ({} valid, {} failed, {} overruns), average solve {:.3} ms",
        summary.ticks,
        summary.valid_ticks,
        summary.failed_ticks,
        summary.overruns,
        summary.average_calculation_time_s * 1e3
    );
    Ok(())
}

fn cmd_init_config(path: &Path) -> CliResult<()> {
    TwinConfig::default().save_yaml(path)?;
    println!("✓ Wrote default configuration to {}", path.display());
    Ok(())
}
