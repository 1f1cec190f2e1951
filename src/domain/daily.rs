//! Daily aggregation of step records.
//!
//! Collapses per-bar step records into one record per calendar date, headed
//! by a synthetic seed record for the position held before the first bar.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::error::SimError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::simulation::SimulationStepRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub holding_quantity: i64,
    pub holding_avg_price: f64,
    /// Last nonzero buy of the day.
    pub buy_quantity: i64,
    pub buy_price: f64,
    /// Last nonzero sell of the day.
    pub sell_quantity: i64,
    pub sell_price: f64,
    pub total_cost: f64,
    pub total_value: f64,
    /// Close of the last bar of the day.
    pub close_price: f64,
}

impl DailyRecord {
    /// Record for the day before `first_date`, representing `quantity`
    /// shares established at `price`. Both trade sides carry the seed.
    pub fn seed(first_date: NaiveDate, quantity: i64, price: f64) -> Self {
        let value = quantity as f64 * price;
        DailyRecord {
            date: first_date - Days::new(1),
            holding_quantity: quantity,
            holding_avg_price: price,
            buy_quantity: quantity,
            buy_price: price,
            sell_quantity: quantity,
            sell_price: price,
            total_cost: value,
            total_value: value,
            close_price: price,
        }
    }

    fn open_bucket(step: &SimulationStepRecord, close_price: f64) -> Self {
        DailyRecord {
            date: step.date(),
            holding_quantity: step.holding_quantity,
            holding_avg_price: step.holding_avg_price,
            buy_quantity: 0,
            buy_price: 0.0,
            sell_quantity: 0,
            sell_price: 0.0,
            total_cost: step.total_cost,
            total_value: step.total_value,
            close_price,
        }
    }

    fn absorb(&mut self, step: &SimulationStepRecord, close_price: f64) {
        self.holding_quantity = step.holding_quantity;
        self.holding_avg_price = step.holding_avg_price;
        self.total_cost = step.total_cost;
        self.total_value = step.total_value;
        self.close_price = close_price;
        if step.buy_quantity > 0 {
            self.buy_quantity = step.buy_quantity;
            self.buy_price = step.buy_price;
        }
        if step.sell_quantity > 0 {
            self.sell_quantity = step.sell_quantity;
            self.sell_price = step.sell_price;
        }
    }
}

/// Close of the latest-timestamped bar for each calendar date.
pub fn daily_closes(bars: &[PriceBar]) -> HashMap<NaiveDate, f64> {
    let mut latest: HashMap<NaiveDate, (NaiveDateTime, f64)> = HashMap::new();
    for bar in bars {
        latest
            .entry(bar.date())
            .and_modify(|entry| {
                if bar.timestamp >= entry.0 {
                    *entry = (bar.timestamp, bar.close);
                }
            })
            .or_insert((bar.timestamp, bar.close));
    }
    latest
        .into_iter()
        .map(|(date, (_, close))| (date, close))
        .collect()
}

/// Fold `steps` into one record per calendar date, preceded by a seed record.
///
/// The seed is dated one day before the first step and priced at the open
/// of the first bar. Holding, cost, value and close take the last step of
/// each date; buy and sell keep the last nonzero trade of each date. Dates
/// with no close in `bars` report a close of 0.
pub fn aggregate_daily(
    steps: &[SimulationStepRecord],
    bars: &[PriceBar],
    seed_quantity: i64,
) -> Result<Vec<DailyRecord>, SimError> {
    let (Some(first_step), Some(first_bar)) = (steps.first(), bars.first()) else {
        return Err(SimError::NoData);
    };

    let closes = daily_closes(bars);
    let mut buckets: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();

    for step in steps {
        let date = step.date();
        let close = closes.get(&date).copied().unwrap_or(0.0);
        buckets
            .entry(date)
            .or_insert_with(|| DailyRecord::open_bucket(step, close))
            .absorb(step, close);
    }

    let mut records = Vec::with_capacity(buckets.len() + 1);
    records.push(DailyRecord::seed(
        first_step.date(),
        seed_quantity,
        first_bar.open,
    ));
    records.extend(buckets.into_values());
    records.sort_by_key(|r| r.date);

    Ok(records)
}
