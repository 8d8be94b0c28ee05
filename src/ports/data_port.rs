//! Price data access port trait.

use crate::domain::error::MacdTesterError;
use crate::domain::series::TimeSeries;

pub trait DataPort {
    /// Daily closing prices for `symbol`, oldest first.
    fn fetch_prices(&self, symbol: &str) -> Result<TimeSeries, MacdTesterError>;

    /// Every symbol the source holds data for, sorted.
    fn list_symbols(&self) -> Result<Vec<String>, MacdTesterError>;
}
