#![allow(dead_code)]

use chrono::NaiveDate;
use macdtester::domain::error::MacdTesterError;
use macdtester::domain::series::TimeSeries;
use macdtester::ports::data_port::DataPort;
use std::collections::BTreeMap;

pub struct MockDataPort {
    pub data: BTreeMap<String, TimeSeries>,
    pub errors: BTreeMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: TimeSeries) -> Self {
        self.data.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<TimeSeries, MacdTesterError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MacdTesterError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| MacdTesterError::DataSource {
                reason: format!("no data for {symbol}"),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacdTesterError> {
        Ok(self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily series starting 2024-01-01.
pub fn series(values: &[f64]) -> TimeSeries {
    let start = date(2024, 1, 1);
    TimeSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + chrono::Duration::days(i as i64), v))
            .collect(),
    )
    .unwrap()
}

pub fn day(n: i64) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(n)
}

/// A price path that oscillates so MACD crosses its signal line repeatedly.
pub fn wave_prices(count: usize, start_price: f64) -> TimeSeries {
    let values: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            start_price + 0.05 * t + 8.0 * (t / 9.0).sin() + 3.0 * (t / 3.7).cos()
        })
        .collect();
    series(&values)
}

/// A strictly rising price path.
pub fn rising_prices(count: usize, start_price: f64) -> TimeSeries {
    let values: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    series(&values)
}
