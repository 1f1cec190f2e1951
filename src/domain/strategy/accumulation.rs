//! Threshold accumulation: trade around a base position on minute bars.
//!
//! Each bar runs a sell check and then a buy check against the post-sell
//! state, so both sides can fill on the same bar.

use log::debug;

use super::{DayContext, Strategy, StrategyKind, Trade, Transition};
use crate::domain::error::ValidationError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::params::StrategyParams;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationParams {
    pub initial_quantity: i64,
    /// Floor below which the base position is never sold.
    pub min_holding: i64,
    /// Ceiling on accumulation.
    pub max_holding: i64,
    pub trade_quantity: i64,
    pub down_threshold: f64,
    pub up_threshold: f64,
}

impl AccumulationParams {
    pub fn from_params(params: &StrategyParams) -> Result<Self, ValidationError> {
        Ok(AccumulationParams {
            initial_quantity: params.quantity("initialQuantity")?,
            min_holding: params.quantity("minHolding")?,
            max_holding: params.quantity("maxHolding")?,
            trade_quantity: params.quantity("tradeQuantity")?,
            down_threshold: params.number("downThreshold")?,
            up_threshold: params.number("upThreshold")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdAccumulationStrategy {
    params: AccumulationParams,
}

impl ThresholdAccumulationStrategy {
    pub fn new(params: AccumulationParams) -> Self {
        Self { params }
    }
}

impl Strategy for ThresholdAccumulationStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ThresholdAccumulation
    }

    fn initial_state(&self, first_bar: &PriceBar) -> PortfolioState {
        PortfolioState::seeded(self.params.initial_quantity, first_bar.open)
    }

    fn seed_quantity(&self) -> i64 {
        self.params.initial_quantity
    }

    fn evaluate(&self, state: PortfolioState, context: DayContext, bar: &PriceBar) -> Transition {
        let p = &self.params;
        let mut state = state;
        let mut context = context;
        let mut trade = Trade::default();
        let price = bar.close;

        // Shares bought today are not sellable until the next date.
        let sellable = state.holding_quantity - context.bought_today - p.min_holding;
        if sellable > 0 && price >= state.avg_price() * p.up_threshold {
            let quantity = p.trade_quantity.min(sellable).min(bar.volume);
            if quantity > 0 {
                trade.sell_quantity = state.sell(quantity);
                trade.sell_price = price;
                debug!(
                    "{} sell {} @ {:.4}, holding {}",
                    bar.timestamp, trade.sell_quantity, price, state.holding_quantity
                );
            }
        }

        if state.holding_quantity < p.max_holding {
            let reference = if state.holding_quantity > 0 {
                state.avg_price()
            } else {
                price
            };
            if price <= reference * p.down_threshold {
                let quantity = p
                    .trade_quantity
                    .min(p.max_holding - state.holding_quantity)
                    .min(bar.volume);
                if quantity > 0 {
                    state.buy(quantity, price);
                    context.bought_today += quantity;
                    trade.buy_quantity = quantity;
                    trade.buy_price = price;
                    debug!(
                        "{} buy {} @ {:.4}, holding {}",
                        bar.timestamp, quantity, price, state.holding_quantity
                    );
                }
            }
        }

        Transition {
            state,
            context,
            trade,
        }
    }
}
