//! Simulation engine: replays bars through a strategy one bar at a time.

use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use crate::domain::daily::{aggregate_daily, DailyRecord};
use crate::domain::error::SimError;
use crate::domain::ohlcv::{serialize_timestamp, PriceBar};
use crate::domain::params::StrategyParams;
use crate::domain::portfolio::PortfolioState;
use crate::domain::strategy::{create_strategy, DayContext, Strategy, Trade};

/// Portfolio snapshot after one bar has been evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStepRecord {
    #[serde(rename = "datetime", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub holding_quantity: i64,
    pub holding_avg_price: f64,
    pub buy_quantity: i64,
    pub buy_price: f64,
    pub sell_quantity: i64,
    pub sell_price: f64,
    pub total_cost: f64,
    pub total_value: f64,
}

impl SimulationStepRecord {
    pub fn new(bar: &PriceBar, state: &PortfolioState, trade: &Trade) -> Self {
        SimulationStepRecord {
            timestamp: bar.timestamp,
            holding_quantity: state.holding_quantity,
            holding_avg_price: state.avg_price(),
            buy_quantity: trade.buy_quantity,
            buy_price: trade.buy_price,
            sell_quantity: trade.sell_quantity,
            sell_price: trade.sell_price,
            total_cost: state.holding_cost,
            total_value: state.market_value(bar.close),
        }
    }

    pub fn date(&self) -> chrono::NaiveDate {
        self.timestamp.date()
    }
}

/// Run `strategy` over `bars`, producing exactly one record per bar.
///
/// Bars must be in ascending timestamp order. An empty slice yields an empty
/// result.
pub fn simulate_steps(strategy: &dyn Strategy, bars: &[PriceBar]) -> Vec<SimulationStepRecord> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };

    let mut state = strategy.initial_state(first);
    let mut context = DayContext::default();
    let mut records = Vec::with_capacity(bars.len());

    for bar in bars {
        let transition = strategy.evaluate(state, context.enter(bar.date()), bar);
        state = transition.state;
        context = transition.context;
        records.push(SimulationStepRecord::new(bar, &state, &transition.trade));
    }

    records
}

/// Output of a full simulation: per-bar steps and the daily report.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub steps: Vec<SimulationStepRecord>,
    pub daily: Vec<DailyRecord>,
}

/// Simulate an already-built strategy and aggregate to daily records.
pub fn run_strategy(
    strategy: &dyn Strategy,
    bars: &[PriceBar],
) -> Result<SimulationResult, SimError> {
    if bars.is_empty() {
        return Err(SimError::NoData);
    }

    let steps = simulate_steps(strategy, bars);
    let daily = aggregate_daily(&steps, bars, strategy.seed_quantity())?;
    info!(
        "simulated {} over {} bars, {} trading days",
        strategy.id(),
        bars.len(),
        daily.len() - 1
    );

    Ok(SimulationResult { steps, daily })
}

/// Validate, simulate and aggregate in one call.
pub fn simulate(
    strategy_id: &str,
    params: &StrategyParams,
    bars: &[PriceBar],
) -> Result<Vec<DailyRecord>, SimError> {
    let strategy = create_strategy(strategy_id, params)?;
    run_strategy(strategy.as_ref(), bars).map(|result| result.daily)
}
