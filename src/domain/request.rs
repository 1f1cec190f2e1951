//! End-to-end simulation request: validate, fetch, simulate, summarise.

use chrono::NaiveDate;
use log::{info, warn};

use crate::domain::daily::DailyRecord;
use crate::domain::error::SimError;
use crate::domain::ohlcv::Resolution;
use crate::domain::params::{validate_params, StrategyParams};
use crate::domain::simulation::{run_strategy, SimulationStepRecord};
use crate::domain::strategy::StrategyKind;
use crate::domain::summary::Summary;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strategy_id: String,
    pub params: StrategyParams,
    /// Overrides the strategy's own bar resolution.
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub kind: StrategyKind,
    pub resolution: Resolution,
    pub bar_count: usize,
    pub steps: Vec<SimulationStepRecord>,
    pub daily: Vec<DailyRecord>,
    pub summary: Summary,
}

pub fn run_simulation(
    data_port: &dyn DataPort,
    request: &SimulationRequest,
) -> Result<SimulationOutcome, SimError> {
    let kind = validate_params(&request.strategy_id, &request.params)?;
    let strategy = kind.build(&request.params)?;
    let resolution = request.resolution.unwrap_or_else(|| strategy.resolution());

    info!(
        "fetching {} bars for {} from {} to {}",
        resolution, request.symbol, request.start_date, request.end_date
    );
    let bars = data_port.fetch_bars(
        &request.symbol,
        request.start_date,
        request.end_date,
        resolution,
    )?;
    if bars.is_empty() {
        warn!(
            "no {} bars for {} between {} and {}",
            resolution, request.symbol, request.start_date, request.end_date
        );
        return Err(SimError::NoData);
    }

    let result = run_strategy(strategy.as_ref(), &bars)?;
    let summary = Summary::compute(&result.daily);

    Ok(SimulationOutcome {
        kind,
        resolution,
        bar_count: bars.len(),
        steps: result.steps,
        daily: result.daily,
        summary,
    })
}
