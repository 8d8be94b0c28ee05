//! Trade records and per-period trade groups.

use crate::domain::error::MacdTesterError;
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

/// Capital committed to every trade.
pub const UNIT_CAPITAL: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    buy_point: NaiveDate,
    sell_point: NaiveDate,
    capital: f64,
}

impl Trade {
    pub fn new(buy_point: NaiveDate, sell_point: NaiveDate) -> Self {
        debug_assert!(buy_point <= sell_point);
        Self {
            buy_point,
            sell_point,
            capital: UNIT_CAPITAL,
        }
    }

    pub fn buy_point(&self) -> NaiveDate {
        self.buy_point
    }

    pub fn sell_point(&self) -> NaiveDate {
        self.sell_point
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    /// (sell price - buy price) / buy price
    pub fn return_rate(&self, prices: &TimeSeries) -> Result<f64, MacdTesterError> {
        let buy = price_at(prices, self.buy_point)?;
        let sell = price_at(prices, self.sell_point)?;
        Ok((sell - buy) / buy)
    }
}

fn price_at(prices: &TimeSeries, date: NaiveDate) -> Result<f64, MacdTesterError> {
    prices.get(date).ok_or_else(|| MacdTesterError::InvalidIndex {
        date,
        series: "prices".to_string(),
    })
}

/// The trades found in one trading period, in the order they closed.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalTrade {
    trades: Vec<Trade>,
}

impl TotalTrade {
    /// Returns `None` for an empty trade list.
    pub fn new(trades: Vec<Trade>) -> Option<Self> {
        if trades.is_empty() {
            None
        } else {
            Some(Self { trades })
        }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Arithmetic mean of the trades' return rates.
    pub fn profit_rate(&self, prices: &TimeSeries) -> Result<f64, MacdTesterError> {
        let mut sum = 0.0;
        for trade in &self.trades {
            sum += trade.return_rate(prices)?;
        }
        Ok(sum / self.trades.len() as f64)
    }
}
