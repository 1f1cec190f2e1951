//! CLI integration tests for the simulate, validate and bars commands.
//!
//! Tests cover:
//! - Request building from INI files (build_request, build_params)
//! - Command-line overrides
//! - Report format selection
//! - Full `simulate` runs over CSV data on disk
//! - The simulation pipeline with MockDataPort

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;
use tradesim::adapters::file_config_adapter::FileConfigAdapter;
use tradesim::adapters::json_report_adapter::JsonReportAdapter;
use tradesim::cli::{self, Cli, Overrides};
use tradesim::domain::error::SimError;
use tradesim::ports::config_port::ConfigPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{:?}", actual) == format!("{:?}", expected)
}

const VALID_INI: &str = r#"
[simulation]
symbol = 600000.XSHG
start_date = 2024-01-02
end_date = 2024-01-31
strategy = accumulation

[params]
initialQuantity = 100000
minHolding = 100000
maxHolding = 120000
tradeQuantity = 20000
downThreshold = 0.95
upThreshold = 1.05

[report]
format = json
"#;

const MINUTE_CSV: &str = "datetime,open,high,low,close,volume,turnover\n\
2024-01-02 09:31:00,10.0,10.0,10.0,10.0,100000,1000000\n\
2024-01-02 09:32:00,9.0,9.0,9.0,9.0,100000,900000\n\
2024-01-03 09:31:00,10.5,10.5,10.5,10.5,100000,1050000\n";

const DAILY_CSV: &str = "datetime,open,high,low,close,volume\n\
2024-01-02,10.0,10.2,9.4,9.8,1000000\n\
2024-01-03,9.8,10.0,9.7,9.9,1000000\n";

/// A data directory holding minute and daily bars plus an INI pointing at it.
fn workspace(ini_body: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("600000.XSHG_1m.csv"), MINUTE_CSV).unwrap();
    fs::write(dir.path().join("600000.XSHG_1d.csv"), DAILY_CSV).unwrap();

    let ini = format!("{ini_body}\n[data]\ndir = {}\n", dir.path().display());
    let ini_path = dir.path().join("simulation.ini");
    fs::write(&ini_path, ini).unwrap();
    (dir, ini_path)
}

fn run_cli(args: &[&str]) -> ExitCode {
    cli::run(Cli::try_parse_from(args).unwrap())
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

mod request_building {
    use super::*;

    #[test]
    fn build_request_reads_every_field() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let request = cli::build_request(&adapter).unwrap();

        assert_eq!(request.symbol, "600000.XSHG");
        assert_eq!(request.start_date, date(2024, 1, 2));
        assert_eq!(request.end_date, date(2024, 1, 31));
        assert_eq!(request.strategy_id, "accumulation");
        assert_eq!(request.params.len(), 6);
        assert_eq!(request.params.get("maxHolding"), Some(120_000.0));
        assert_eq!(request.params.get("downThreshold"), Some(0.95));
        assert_eq!(request.resolution, None);
    }

    #[test]
    fn resolution_is_optional_override() {
        let ini = VALID_INI.replace(
            "strategy = accumulation",
            "strategy = accumulation\nresolution = 1d",
        );
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let request = cli::build_request(&adapter).unwrap();
        assert_eq!(request.resolution, Some(Resolution::Daily));
    }

    #[test]
    fn non_numeric_param_is_config_error() {
        let ini = VALID_INI.replace("tradeQuantity = 20000", "tradeQuantity = lots");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_params(&adapter).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "tradeQuantity"));
    }

    #[test]
    fn missing_symbol_is_config_error() {
        let ini = VALID_INI.replace("symbol = 600000.XSHG", "");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_request(&adapter).unwrap_err();
        assert!(matches!(err, SimError::ConfigMissing { key, .. } if key == "symbol"));
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            strategy: Some("breakout".into()),
            symbol: Some("000001.XSHE".into()),
            output: Some(PathBuf::from("out.csv")),
            format: Some("csv".into()),
            resolution: Some("1m".into()),
        };
        cli::apply_overrides(&mut adapter, &overrides);

        let request = cli::build_request(&adapter).unwrap();
        assert_eq!(request.symbol, "000001.XSHE");
        assert_eq!(request.strategy_id, "breakout");
        assert_eq!(request.resolution, Some(Resolution::Minute));
        assert_eq!(adapter.get_string("report", "output"), Some("out.csv".into()));
        assert_eq!(adapter.get_string("report", "format"), Some("csv".into()));
    }

    #[test]
    fn unknown_report_format_is_rejected() {
        let ini = VALID_INI.replace("format = json", "format = xml");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        assert!(cli::build_report_port(&adapter).is_err());
    }

    #[test]
    fn data_dir_defaults_when_absent() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::data_dir(&adapter), PathBuf::from("data"));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        assert!(same_code(cli::run_validate(file.path()), ExitCode::SUCCESS));
    }

    #[test]
    fn missing_file_is_config_error() {
        let code = cli::run_validate(Path::new("/nonexistent/simulation.ini"));
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn missing_parameters_is_validation_error() {
        let file = write_temp_ini(&VALID_INI.replace("upThreshold = 1.05", ""));
        assert!(same_code(cli::run_validate(file.path()), ExitCode::from(3)));
    }

    #[test]
    fn unknown_strategy_is_validation_error() {
        let file = write_temp_ini(&VALID_INI.replace("strategy = accumulation", "strategy = grid"));
        assert!(same_code(cli::run_validate(file.path()), ExitCode::from(3)));
    }

    #[test]
    fn start_after_end_is_config_error() {
        let ini = VALID_INI.replace("start_date = 2024-01-02", "start_date = 2024-03-01");
        let file = write_temp_ini(&ini);
        assert!(same_code(cli::run_validate(file.path()), ExitCode::from(2)));
    }

    #[test]
    fn strategies_listing_succeeds() {
        assert!(same_code(cli::run_strategies(), ExitCode::SUCCESS));
    }
}

mod simulate_command {
    use super::*;

    #[test]
    fn writes_json_daily_report() {
        let (dir, ini) = workspace(VALID_INI);
        let output = dir.path().join("daily.json");
        let code = run_cli(&[
            "tradesim",
            "simulate",
            "-c",
            &path_arg(&ini),
            "-o",
            &path_arg(&output),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let rows = report.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["date"], "2024-01-01");
        assert_eq!(rows[0]["holdingQuantity"], 100_000);
        assert_eq!(rows[1]["date"], "2024-01-02");
        assert_eq!(rows[1]["buyQuantity"], 20_000);
        assert_eq!(rows[1]["holdingQuantity"], 120_000);
        assert_eq!(rows[2]["sellQuantity"], 20_000);
        assert_eq!(rows[2]["sellPrice"], 10.5);
    }

    #[test]
    fn csv_steps_report_from_config() {
        let (dir, ini) = workspace(VALID_INI);
        let output = dir.path().join("steps.csv");
        let code = run_cli(&[
            "tradesim",
            "simulate",
            "-c",
            &path_arg(&ini),
            "-o",
            &path_arg(&output),
            "--format",
            "csv",
            "--steps",
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("datetime,holdingQuantity,"));
        assert!(lines[2].starts_with("2024-01-02 09:32,120000,"));
    }

    #[test]
    fn strategy_override_switches_to_daily_bars() {
        let (dir, ini) = workspace(&VALID_INI.replace(
            "upThreshold = 1.05",
            "upThreshold = 1.05\nminHoldingForSell = 20000",
        ));
        let output = dir.path().join("breakout.json");
        let code = run_cli(&[
            "tradesim",
            "simulate",
            "-c",
            &path_arg(&ini),
            "--strategy",
            "breakout",
            "-o",
            &path_arg(&output),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let rows = report.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["holdingQuantity"], 0);
        assert_eq!(rows[1]["buyPrice"], 9.4);
        assert_eq!(rows[1]["sellQuantity"], 0);
        assert_eq!(rows[2]["sellQuantity"], 20_000);
    }

    #[test]
    fn unknown_symbol_is_provider_error() {
        let (dir, ini) = workspace(VALID_INI);
        let code = run_cli(&[
            "tradesim",
            "simulate",
            "-c",
            &path_arg(&ini),
            "--symbol",
            "000001.XSHE",
            "-o",
            &path_arg(&dir.path().join("never.json")),
        ]);
        assert!(same_code(code, ExitCode::from(5)));
        assert!(!dir.path().join("never.json").exists());
    }

    #[test]
    fn empty_range_is_no_data() {
        let (dir, ini) = workspace(VALID_INI);
        let shifted = fs::read_to_string(&ini)
            .unwrap()
            .replace("start_date = 2024-01-02", "start_date = 2024-01-10");
        fs::write(&ini, shifted).unwrap();
        let code = run_cli(&[
            "tradesim",
            "simulate",
            "-c",
            &path_arg(&ini),
            "-o",
            &path_arg(&dir.path().join("never.json")),
        ]);
        assert!(same_code(code, ExitCode::from(4)));
    }
}

mod pipeline {
    use super::*;
    use tradesim::domain::request::SimulationRequest;

    fn request() -> SimulationRequest {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        cli::build_request(&adapter).unwrap()
    }

    #[test]
    fn pipeline_writes_report_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("report.json");
        let d1 = date(2024, 1, 2);
        let port = MockDataPort::new().with_bars(
            "600000.XSHG",
            Resolution::Minute,
            vec![minute_bar(d1, 9, 31, 9.0, 100_000)],
        );

        let code = cli::run_simulation_pipeline(
            &port,
            &request(),
            &JsonReportAdapter,
            Some(&output),
            false,
        );
        assert!(same_code(code, ExitCode::SUCCESS));
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("\"buyQuantity\": 20000"));
    }

    #[test]
    fn pipeline_provider_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("report.json");
        let port = MockDataPort::new().with_error("600000.XSHG", "connection refused");

        let code = cli::run_simulation_pipeline(
            &port,
            &request(),
            &JsonReportAdapter,
            Some(&output),
            false,
        );
        assert!(same_code(code, ExitCode::from(5)));
        assert!(!output.exists());
    }

    #[test]
    fn bars_listing_uses_strategy_resolution() {
        let port = MockDataPort::new().with_bars(
            "600000.XSHG",
            Resolution::Minute,
            vec![
                minute_bar(date(2024, 1, 2), 9, 31, 10.0, 100),
                minute_bar(date(2024, 1, 2), 9, 32, 10.1, 100),
            ],
        );
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let mut out = Vec::new();

        let count = cli::run_bars_with(&port, &adapter, &mut out).unwrap();
        assert_eq!(count, 2);
        let bars: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(bars[0]["datetime"], "2024-01-02 09:31");
        assert_eq!(bars[1]["close"], 10.1);
        assert_eq!(
            port.requests.borrow().as_slice(),
            &[("600000.XSHG".to_string(), Resolution::Minute)]
        );
    }

    #[test]
    fn bars_listing_rejects_reversed_dates_before_fetching() {
        let port = MockDataPort::new();
        let ini = VALID_INI.replace("start_date = 2024-01-02", "start_date = 2024-03-01");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let mut out = Vec::new();

        let err = cli::run_bars_with(&port, &adapter, &mut out).unwrap_err();
        assert!(matches!(err, SimError::ConfigInvalid { key, .. } if key == "start_date"));
        assert!(port.requests.borrow().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn bars_command_exits_with_config_code_on_reversed_dates() {
        let ini = VALID_INI.replace("start_date = 2024-01-02", "start_date = 2024-03-01");
        let (_dir, ini_path) = workspace(&ini);

        let code = run_cli(&["tradesim", "bars", "-c", &path_arg(&ini_path)]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn bars_command_succeeds_on_valid_config() {
        let (_dir, ini_path) = workspace(VALID_INI);

        let code = run_cli(&["tradesim", "bars", "-c", &path_arg(&ini_path)]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }
}
