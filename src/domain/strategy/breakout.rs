//! Breakout range: buy intraday breaks below the open, sell breaks above cost.
//!
//! Runs on daily bars. The buy check runs first and stamps `last_buy_date`,
//! which blocks the sell check on the same date.

use log::debug;

use super::{DayContext, Strategy, StrategyKind, Trade, Transition};
use crate::domain::error::ValidationError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::params::StrategyParams;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutParams {
    pub trade_quantity: i64,
    pub max_holding: i64,
    pub min_holding_for_sell: i64,
    pub down_threshold: f64,
    pub up_threshold: f64,
}

impl BreakoutParams {
    pub fn from_params(params: &StrategyParams) -> Result<Self, ValidationError> {
        Ok(BreakoutParams {
            trade_quantity: params.quantity("tradeQuantity")?,
            max_holding: params.quantity("maxHolding")?,
            min_holding_for_sell: params.quantity("minHoldingForSell")?,
            down_threshold: params.number("downThreshold")?,
            up_threshold: params.number("upThreshold")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BreakoutRangeStrategy {
    params: BreakoutParams,
}

impl BreakoutRangeStrategy {
    pub fn new(params: BreakoutParams) -> Self {
        Self { params }
    }
}

impl Strategy for BreakoutRangeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BreakoutRange
    }

    fn initial_state(&self, _first_bar: &PriceBar) -> PortfolioState {
        PortfolioState::default()
    }

    fn seed_quantity(&self) -> i64 {
        0
    }

    fn evaluate(&self, state: PortfolioState, context: DayContext, bar: &PriceBar) -> Transition {
        let p = &self.params;
        let mut state = state;
        let mut context = context;
        let mut trade = Trade::default();
        let date = bar.date();

        if state.holding_quantity < p.max_holding && bar.low <= bar.open * p.down_threshold {
            let quantity = p.trade_quantity.min(p.max_holding - state.holding_quantity);
            if quantity > 0 {
                state.buy(quantity, bar.low);
                context.last_buy_date = Some(date);
                trade.buy_quantity = quantity;
                trade.buy_price = bar.low;
                debug!(
                    "{} buy {} @ {:.4}, holding {}",
                    date, quantity, bar.low, state.holding_quantity
                );
            }
        }

        if state.holding_quantity >= p.min_holding_for_sell
            && bar.high >= state.avg_price() * p.up_threshold
            && context.last_buy_date != Some(date)
        {
            let quantity = p.trade_quantity.min(state.holding_quantity);
            if quantity > 0 {
                trade.sell_quantity = state.sell(quantity);
                trade.sell_price = bar.high;
                debug!(
                    "{} sell {} @ {:.4}, holding {}",
                    date, trade.sell_quantity, bar.high, state.holding_quantity
                );
            }
        }

        Transition {
            state,
            context,
            trade,
        }
    }
}
