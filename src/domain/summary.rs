//! End-of-run statistics over the daily report.

use serde::Serialize;

use super::daily::DailyRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub trading_days: usize,
    pub buy_days: usize,
    pub sell_days: usize,
    pub total_bought: i64,
    pub total_sold: i64,
    pub final_holding: i64,
    pub final_avg_price: f64,
    pub final_cost: f64,
    pub final_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
}

impl Summary {
    /// The first record is treated as the seed and excluded from trade counts.
    pub fn compute(daily: &[DailyRecord]) -> Self {
        let days = daily.get(1..).unwrap_or(&[]);

        let buy_days = days.iter().filter(|r| r.buy_quantity > 0).count();
        let sell_days = days.iter().filter(|r| r.sell_quantity > 0).count();
        let total_bought = days.iter().map(|r| r.buy_quantity).sum();
        let total_sold = days.iter().map(|r| r.sell_quantity).sum();

        let (final_holding, final_avg_price, final_cost, final_value) = daily
            .last()
            .map(|r| {
                (
                    r.holding_quantity,
                    r.holding_avg_price,
                    r.total_cost,
                    r.total_value,
                )
            })
            .unwrap_or((0, 0.0, 0.0, 0.0));

        let unrealized_pnl = final_value - final_cost;
        let unrealized_pnl_pct = if final_cost > 0.0 {
            unrealized_pnl / final_cost
        } else {
            0.0
        };

        Summary {
            trading_days: days.len(),
            buy_days,
            sell_days,
            total_bought,
            total_sold,
            final_holding,
            final_avg_price,
            final_cost,
            final_value,
            unrealized_pnl,
            unrealized_pnl_pct,
        }
    }
}
