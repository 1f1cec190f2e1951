//! Market data access port.

use crate::domain::error::SimError;
use crate::domain::ohlcv::{PriceBar, Resolution};
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` whose calendar date lies in `[start_date, end_date]`,
    /// ascending by timestamp. Empty when the range holds no data; upstream
    /// failures surface as [`SimError::Provider`].
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> Result<Vec<PriceBar>, SimError>;
}
