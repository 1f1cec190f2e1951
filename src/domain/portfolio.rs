//! Running single-asset portfolio state.
//!
//! Holds the share count and its total cost basis. Every mutation keeps
//! `holding_cost == holding_quantity * avg_price()`.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioState {
    pub holding_quantity: i64,
    pub holding_cost: f64,
}

impl PortfolioState {
    pub fn new(holding_quantity: i64, holding_cost: f64) -> Self {
        PortfolioState {
            holding_quantity,
            holding_cost,
        }
    }

    /// Seed position of `quantity` shares bought at `price`.
    pub fn seeded(quantity: i64, price: f64) -> Self {
        PortfolioState::new(quantity, quantity as f64 * price)
    }

    /// Weighted-average acquisition price, 0 when flat.
    pub fn avg_price(&self) -> f64 {
        if self.holding_quantity > 0 {
            self.holding_cost / self.holding_quantity as f64
        } else {
            0.0
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.holding_quantity as f64 * price
    }

    pub fn buy(&mut self, quantity: i64, price: f64) {
        self.holding_cost += quantity as f64 * price;
        self.holding_quantity += quantity;
    }

    /// Sell at most the current holding. The cost basis is rescaled by the
    /// remaining fraction so the average price is unchanged.
    pub fn sell(&mut self, quantity: i64) -> i64 {
        let sold = quantity.min(self.holding_quantity).max(0);
        if sold == 0 {
            return 0;
        }
        let remaining = self.holding_quantity - sold;
        self.holding_cost *= remaining as f64 / (remaining + sold) as f64;
        self.holding_quantity = remaining;
        sold
    }
}
