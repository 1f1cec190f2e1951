#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use tradesim::domain::error::SimError;
pub use tradesim::domain::ohlcv::{PriceBar, Resolution};
use tradesim::domain::params::StrategyParams;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<(String, Resolution), Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Resolution)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, resolution: Resolution, bars: Vec<PriceBar>) -> Self {
        self.data.insert((symbol.to_string(), resolution), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> Result<Vec<PriceBar>, SimError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), resolution));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SimError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&(symbol.to_string(), resolution))
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date() >= start_date && b.date() <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

/// A minute bar whose open, high, low and close all equal `close`.
pub fn minute_bar(day: NaiveDate, hour: u32, minute: u32, close: f64, volume: i64) -> PriceBar {
    PriceBar {
        timestamp: at(day, hour, minute),
        open: close,
        high: close,
        low: close,
        close,
        volume,
        turnover: close * volume as f64,
    }
}

pub fn daily_bar(day: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
    PriceBar {
        timestamp: at(day, 0, 0),
        open,
        high,
        low,
        close,
        volume: 1_000_000,
        turnover: 0.0,
    }
}

pub fn accumulation_params() -> StrategyParams {
    StrategyParams::new()
        .with("initialQuantity", 100_000.0)
        .with("minHolding", 100_000.0)
        .with("maxHolding", 120_000.0)
        .with("tradeQuantity", 20_000.0)
        .with("downThreshold", 0.95)
        .with("upThreshold", 1.05)
}

pub fn breakout_params() -> StrategyParams {
    StrategyParams::new()
        .with("tradeQuantity", 20_000.0)
        .with("maxHolding", 120_000.0)
        .with("minHoldingForSell", 20_000.0)
        .with("downThreshold", 0.95)
        .with("upThreshold", 1.05)
}
