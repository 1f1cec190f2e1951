//! Configuration validation.
//!
//! Checks the `[simulation]` and `[report]` sections before any data is
//! fetched. Strategy parameters are checked separately by
//! [`crate::domain::params::validate_params`].

use crate::domain::error::SimError;
use crate::domain::ohlcv::Resolution;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const REPORT_FORMATS: [&str; 2] = ["json", "csv"];

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    validate_required(config, "simulation", "symbol")?;
    validate_required(config, "simulation", "strategy")?;
    parse_date_range(config)?;
    validate_resolution(config)?;
    validate_report(config)?;
    Ok(())
}

fn validate_required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), SimError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// `start_date` and `end_date`, checked to be in order.
pub fn parse_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SimError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date > end_date {
        return Err(SimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok((start_date, end_date))
}

/// Parse a `YYYY-MM-DD` date from the `[simulation]` section.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, SimError> {
    match config.get_string("simulation", field) {
        None => Err(SimError::ConfigMissing {
            section: "simulation".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SimError::ConfigInvalid {
                section: "simulation".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

/// Optional `[simulation] resolution` override.
pub fn parse_resolution(config: &dyn ConfigPort) -> Result<Option<Resolution>, SimError> {
    match config.get_string("simulation", "resolution") {
        Some(s) if !s.trim().is_empty() => {
            s.parse().map(Some).map_err(|reason| SimError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "resolution".to_string(),
                reason,
            })
        }
        _ => Ok(None),
    }
}

fn validate_resolution(config: &dyn ConfigPort) -> Result<(), SimError> {
    parse_resolution(config).map(|_| ())
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), SimError> {
    if let Some(format) = config.get_string("report", "format") {
        let format = format.trim().to_lowercase();
        if !REPORT_FORMATS.contains(&format.as_str()) {
            return Err(SimError::ConfigInvalid {
                section: "report".to_string(),
                key: "format".to_string(),
                reason: format!("unknown format '{}', expected json or csv", format),
            });
        }
    }
    Ok(())
}
