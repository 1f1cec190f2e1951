//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{
    parse_date, parse_date_range, parse_resolution, validate_simulation_config,
};
use crate::domain::error::{SimError, ValidationError};
use crate::domain::ohlcv::Resolution;
use crate::domain::params::{validate_params, StrategyParams};
use crate::domain::request::{run_simulation, SimulationOutcome, SimulationRequest};
use crate::domain::strategy::StrategyKind;
use crate::domain::summary::Summary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Threshold trading strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation and write the daily report
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        format: Option<String>,
        /// Write per-bar step records instead of daily records
        #[arg(long)]
        steps: bool,
    },
    /// Validate a simulation configuration and its strategy parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the available strategies
    Strategies,
    /// Print the price bars a simulation would replay
    Bars {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        resolution: Option<String>,
    },
}

/// Command-line values that take precedence over the INI file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub strategy: Option<String>,
    pub symbol: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub resolution: Option<String>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            strategy,
            symbol,
            output,
            format,
            steps,
        } => {
            let overrides = Overrides {
                strategy,
                symbol,
                output,
                format,
                resolution: None,
            };
            run_simulate(&config, &overrides, steps)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
        Command::Bars {
            config,
            symbol,
            resolution,
        } => {
            let overrides = Overrides {
                symbol,
                resolution,
                ..Overrides::default()
            };
            run_bars(&config, &overrides)
        }
    }
}

fn fail(err: SimError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        fail(SimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

pub fn apply_overrides(adapter: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(strategy) = &overrides.strategy {
        adapter.set("simulation", "strategy", strategy);
    }
    if let Some(symbol) = &overrides.symbol {
        adapter.set("simulation", "symbol", symbol);
    }
    if let Some(resolution) = &overrides.resolution {
        adapter.set("simulation", "resolution", resolution);
    }
    if let Some(format) = &overrides.format {
        adapter.set("report", "format", format);
    }
    if let Some(output) = &overrides.output {
        adapter.set("report", "output", &output.display().to_string());
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SimError> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SimError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

/// Every key of `[params]` parsed as a number.
pub fn build_params(config: &dyn ConfigPort) -> Result<StrategyParams, SimError> {
    config
        .keys("params")
        .into_iter()
        .map(|key| {
            let raw = config.get_string("params", &key).unwrap_or_default();
            match raw.trim().parse::<f64>() {
                Ok(value) => Ok((key, value)),
                Err(_) => Err(SimError::ConfigInvalid {
                    section: "params".into(),
                    key,
                    reason: format!("expected a number, got '{}'", raw.trim()),
                }),
            }
        })
        .collect()
}

pub fn build_request(config: &dyn ConfigPort) -> Result<SimulationRequest, SimError> {
    Ok(SimulationRequest {
        symbol: required(config, "simulation", "symbol")?,
        start_date: parse_date(config, "start_date")?,
        end_date: parse_date(config, "end_date")?,
        strategy_id: required(config, "simulation", "strategy")?,
        params: build_params(config)?,
        resolution: parse_resolution(config)?,
    })
}

pub fn build_report_port(config: &dyn ConfigPort) -> Result<Box<dyn ReportPort>, SimError> {
    let format = config
        .get_string("report", "format")
        .map(|f| f.trim().to_lowercase())
        .unwrap_or_else(|| "json".to_string());
    match format.as_str() {
        "json" => Ok(Box::new(JsonReportAdapter)),
        "csv" => Ok(Box::new(CsvReportAdapter)),
        other => Err(SimError::ConfigInvalid {
            section: "report".into(),
            key: "format".into(),
            reason: format!("unknown format '{}', expected json or csv", other),
        }),
    }
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "dir")
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, SimError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| SimError::Report {
                reason: format!("failed to create {}: {}", path.display(), e),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run_simulate(config_path: &Path, overrides: &Overrides, steps: bool) -> ExitCode {
    // Stage 1: Load config and apply overrides
    eprintln!("Loading config from {}", config_path.display());
    let mut adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    apply_overrides(&mut adapter, overrides);

    // Stage 2: Validate and build the request
    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(e);
    }
    let request = match build_request(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let report = match build_report_port(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let output = adapter.get_string("report", "output").map(PathBuf::from);
    let steps = steps || adapter.get_bool("report", "steps", false);

    // Stage 3: Simulate and report
    let data_port = CsvAdapter::new(data_dir(&adapter));
    run_simulation_pipeline(&data_port, &request, report.as_ref(), output.as_deref(), steps)
}

pub fn run_simulation_pipeline(
    data_port: &dyn DataPort,
    request: &SimulationRequest,
    report: &dyn ReportPort,
    output: Option<&Path>,
    steps: bool,
) -> ExitCode {
    eprintln!(
        "Simulating {} on {}: {} to {}",
        request.strategy_id, request.symbol, request.start_date, request.end_date
    );

    let outcome = match run_simulation(data_port, request) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    print_summary(&outcome);

    let result = open_output(output).and_then(|mut out| {
        if steps {
            report.write_steps(&outcome.steps, out.as_mut())?;
        } else {
            report.write_daily(&outcome.daily, out.as_mut())?;
        }
        out.flush()?;
        Ok(())
    });

    match result {
        Ok(()) => {
            if let Some(path) = output {
                eprintln!("\nReport written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn print_summary(outcome: &SimulationOutcome) {
    let Summary {
        trading_days,
        buy_days,
        sell_days,
        total_bought,
        total_sold,
        final_holding,
        final_avg_price,
        final_cost,
        final_value,
        unrealized_pnl,
        unrealized_pnl_pct,
    } = &outcome.summary;

    eprintln!("\n=== {} ({}) ===", outcome.kind.name(), outcome.resolution);
    eprintln!("Bars replayed:    {}", outcome.bar_count);
    eprintln!("Trading days:     {}", trading_days);
    eprintln!("Buy days:         {} ({} shares)", buy_days, total_bought);
    eprintln!("Sell days:        {} ({} shares)", sell_days, total_sold);
    eprintln!("Final holding:    {}", final_holding);
    eprintln!("Average price:    {:.4}", final_avg_price);
    eprintln!("Total cost:       {:.2}", final_cost);
    eprintln!("Market value:     {:.2}", final_value);
    let sign = if *unrealized_pnl >= 0.0 { "+" } else { "" };
    eprintln!(
        "Unrealized P&L:   {}{:.2} ({}{:.2}%)",
        sign,
        unrealized_pnl,
        sign,
        unrealized_pnl_pct * 100.0
    );
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(e);
    }
    let request = match build_request(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    if let Err(e) = build_report_port(&adapter) {
        return fail(e);
    }
    let kind = match validate_params(&request.strategy_id, &request.params) {
        Ok(k) => k,
        Err(e) => return fail(e.into()),
    };

    let resolution = request.resolution.unwrap_or_else(|| kind.resolution());
    eprintln!("\nStrategy:   {} ({})", kind.name(), kind.id());
    eprintln!("Symbol:     {}", request.symbol);
    eprintln!("Range:      {} to {}", request.start_date, request.end_date);
    eprintln!("Resolution: {}", resolution);
    eprintln!("Parameters:");
    for name in kind.required_params() {
        if let Some(value) = request.params.get(name) {
            eprintln!("  {:<18} {}", name, value);
        }
    }
    for (name, _) in request.params.iter() {
        if !kind.required_params().iter().any(|required| *required == name) {
            eprintln!("  {:<18} (ignored)", name);
        }
    }

    eprintln!("\nSimulation configuration is valid.");
    ExitCode::SUCCESS
}

pub fn run_strategies() -> ExitCode {
    for kind in StrategyKind::ALL {
        println!("{} - {}", kind.id(), kind.name());
        println!("  {}", kind.description());
        println!("  aliases:    {}", kind.aliases().join(", "));
        println!("  resolution: {}", kind.resolution());
        println!("  parameters: {}", kind.required_params().join(", "));
    }
    ExitCode::SUCCESS
}

fn resolve_bar_resolution(config: &dyn ConfigPort) -> Result<Resolution, SimError> {
    if let Some(resolution) = parse_resolution(config)? {
        return Ok(resolution);
    }
    let id = required(config, "simulation", "strategy")?;
    StrategyKind::from_id(&id)
        .map(|kind| kind.resolution())
        .ok_or_else(|| ValidationError::UnsupportedStrategy(id).into())
}

/// Fetch the configured bars and write them to `out` as a JSON array.
pub fn run_bars_with(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    out: &mut dyn Write,
) -> Result<usize, SimError> {
    let symbol = required(config, "simulation", "symbol")?;
    let (start_date, end_date) = parse_date_range(config)?;
    let resolution = resolve_bar_resolution(config)?;

    info!("listing {} bars for {}", resolution, symbol);
    let bars = data_port.fetch_bars(&symbol, start_date, end_date, resolution)?;
    serde_json::to_writer_pretty(&mut *out, &bars).map_err(|e| SimError::Report {
        reason: format!("JSON encode error: {}", e),
    })?;
    writeln!(out)?;
    Ok(bars.len())
}

fn run_bars(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let mut adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    apply_overrides(&mut adapter, overrides);

    let data_port = CsvAdapter::new(data_dir(&adapter));
    let mut stdout = io::stdout().lock();
    match run_bars_with(&data_port, &adapter, &mut stdout) {
        Ok(count) => {
            eprintln!("{} bars", count);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
