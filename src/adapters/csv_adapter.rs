//! CSV file market data adapter.
//!
//! Reads `<base_path>/<symbol>_<resolution>.csv` with a header row of
//! `datetime,open,high,low,close,volume[,turnover]`.

use crate::domain::error::SimError;
use crate::domain::ohlcv::{PriceBar, Resolution};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, resolution: Resolution) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol, resolution.as_str()))
    }
}

fn provider_error(reason: impl Into<String>) -> SimError {
    SimError::Provider {
        reason: reason.into(),
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SimError> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| provider_error(format!("invalid datetime: {}", value)))
}

/// Non-negative finite number from column `index`.
fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SimError> {
    let raw = record
        .get(index)
        .ok_or_else(|| provider_error(format!("missing {} column", name)))?
        .trim();
    let value: f64 = raw
        .parse()
        .map_err(|e| provider_error(format!("invalid {} value: {}", name, e)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(provider_error(format!(
            "invalid {} value: {} is not a non-negative number",
            name, raw
        )));
    }
    Ok(value)
}

/// Share count; `55000.0` is accepted, fractions are not.
fn parse_volume(record: &csv::StringRecord, index: usize) -> Result<i64, SimError> {
    let value = parse_field(record, index, "volume")?;
    if value.fract() != 0.0 || value > i64::MAX as f64 {
        return Err(provider_error(format!(
            "invalid volume value: {} is not a whole number of shares",
            value
        )));
    }
    Ok(value as i64)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> Result<Vec<PriceBar>, SimError> {
        let path = self.csv_path(symbol, resolution);
        let content = fs::read_to_string(&path)
            .map_err(|e| provider_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| provider_error(format!("CSV parse error: {}", e)))?;

            let datetime = record
                .get(0)
                .ok_or_else(|| provider_error("missing datetime column"))?;
            let timestamp = parse_timestamp(datetime)?;

            let date = timestamp.date();
            if date < start_date || date > end_date {
                continue;
            }

            let turnover = match record.get(6) {
                Some(v) if !v.trim().is_empty() => parse_field(&record, 6, "turnover")?,
                _ => 0.0,
            };

            bars.push(PriceBar {
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_volume(&record, 5)?,
                turnover,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!("read {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }
}
