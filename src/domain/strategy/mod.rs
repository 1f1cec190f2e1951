//! Strategy trait, per-bar transition types and the strategy registry.
//!
//! A strategy is a pure transition `(state, context, bar) -> (state, context, trade)`.
//! It never owns running state; the simulation engine threads
//! [`PortfolioState`] and [`DayContext`] through successive calls, so one
//! strategy value can drive any number of independent runs.

pub mod accumulation;
pub mod breakout;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::ValidationError;
use crate::domain::ohlcv::{PriceBar, Resolution};
use crate::domain::params::{validate_params, StrategyParams};
use crate::domain::portfolio::PortfolioState;

pub use accumulation::{AccumulationParams, ThresholdAccumulationStrategy};
pub use breakout::{BreakoutParams, BreakoutRangeStrategy};

/// Fills executed on one bar. Zero quantity means no trade on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trade {
    pub buy_quantity: i64,
    pub buy_price: f64,
    pub sell_quantity: i64,
    pub sell_price: f64,
}

impl Trade {
    pub fn has_buy(&self) -> bool {
        self.buy_quantity > 0
    }

    pub fn has_sell(&self) -> bool {
        self.sell_quantity > 0
    }
}

/// Intraday bookkeeping carried from bar to bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DayContext {
    pub current_date: Option<NaiveDate>,
    /// Shares bought since the start of `current_date`.
    pub bought_today: i64,
    pub last_buy_date: Option<NaiveDate>,
}

impl DayContext {
    /// Context for a bar dated `date`; crossing into a new calendar date
    /// resets `bought_today`.
    pub fn enter(self, date: NaiveDate) -> Self {
        if self.current_date == Some(date) {
            self
        } else {
            DayContext {
                current_date: Some(date),
                bought_today: 0,
                ..self
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: PortfolioState,
    pub context: DayContext,
    pub trade: Trade,
}

pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Position held before the first bar is evaluated.
    fn initial_state(&self, first_bar: &PriceBar) -> PortfolioState;

    /// Quantity reported on the seed day of the daily report.
    fn seed_quantity(&self) -> i64;

    fn evaluate(&self, state: PortfolioState, context: DayContext, bar: &PriceBar) -> Transition;

    fn id(&self) -> &'static str {
        self.kind().id()
    }

    fn resolution(&self) -> Resolution {
        self.kind().resolution()
    }
}

/// Registered strategy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    ThresholdAccumulation,
    BreakoutRange,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [
        StrategyKind::ThresholdAccumulation,
        StrategyKind::BreakoutRange,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::ThresholdAccumulation => "accumulation",
            StrategyKind::BreakoutRange => "breakout",
        }
    }

    /// Identifiers accepted in addition to [`StrategyKind::id`].
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            StrategyKind::ThresholdAccumulation => &["xue_strategy"],
            StrategyKind::BreakoutRange => &["yu_strategy_1"],
        }
    }

    pub fn from_id(id: &str) -> Option<StrategyKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id || kind.aliases().iter().any(|alias| *alias == id))
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::ThresholdAccumulation => "Threshold accumulation",
            StrategyKind::BreakoutRange => "Breakout range",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::ThresholdAccumulation => {
                "Holds a base position; buys dips below average cost up to maxHolding, \
                 sells rallies above it down to minHolding, capped by bar volume"
            }
            StrategyKind::BreakoutRange => {
                "Buys at the day low when it breaks below the open, sells at the day high \
                 above average cost, never on the day of a buy"
            }
        }
    }

    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            StrategyKind::ThresholdAccumulation => &[
                "initialQuantity",
                "minHolding",
                "maxHolding",
                "tradeQuantity",
                "downThreshold",
                "upThreshold",
            ],
            StrategyKind::BreakoutRange => &[
                "tradeQuantity",
                "maxHolding",
                "minHoldingForSell",
                "downThreshold",
                "upThreshold",
            ],
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            StrategyKind::ThresholdAccumulation => Resolution::Minute,
            StrategyKind::BreakoutRange => Resolution::Daily,
        }
    }

    pub fn build(&self, params: &StrategyParams) -> Result<Box<dyn Strategy>, ValidationError> {
        Ok(match self {
            StrategyKind::ThresholdAccumulation => Box::new(ThresholdAccumulationStrategy::new(
                AccumulationParams::from_params(params)?,
            )),
            StrategyKind::BreakoutRange => Box::new(BreakoutRangeStrategy::new(
                BreakoutParams::from_params(params)?,
            )),
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Validate `params` for `strategy_id` and construct the strategy.
pub fn create_strategy(
    strategy_id: &str,
    params: &StrategyParams,
) -> Result<Box<dyn Strategy>, ValidationError> {
    validate_params(strategy_id, params)?.build(params)
}
