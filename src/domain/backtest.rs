//! Per-symbol backtest: segment, extract, and reduce to rates.
//!
//! BacktestParams defines the indicator and warm-up parameters used by the
//! universe runner.

use crate::domain::error::MacdTesterError;
use crate::domain::extractor::extract_trades;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::period::{starting_up_crossing, trading_periods};
use crate::domain::series::{MarketSeries, TimeSeries};
use crate::domain::trade::TotalTrade;
use chrono::NaiveDate;

/// Bars dropped from the head of every series before testing.
pub const DEFAULT_WARMUP: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestParams {
    pub k: f64,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub warmup: usize,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            k: 1.0,
            fast_period: DEFAULT_FAST,
            slow_period: DEFAULT_SLOW,
            signal_period: DEFAULT_SIGNAL,
            warmup: DEFAULT_WARMUP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestResult {
    /// Fraction of trade groups with a positive profit rate.
    pub success_rate: Option<f64>,
    /// Mean profit rate over trade groups.
    pub profit_rate: Option<f64>,
    /// Periods that produced at least one trade.
    pub trade_groups: usize,
    pub trades: usize,
}

impl BacktestResult {
    pub fn has_trades(&self) -> bool {
        self.profit_rate.is_some()
    }
}

/// Validate alignment of the four series, then run [`run_market_backtest`].
pub fn run_backtest(
    prices: &TimeSeries,
    macd: &TimeSeries,
    signal_line: &TimeSeries,
    modified_signal_line: &TimeSeries,
) -> Result<BacktestResult, MacdTesterError> {
    let market = MarketSeries::new(
        prices.clone(),
        macd.clone(),
        signal_line.clone(),
        modified_signal_line.clone(),
    )?;
    run_market_backtest(&market)
}

pub fn run_market_backtest(market: &MarketSeries) -> Result<BacktestResult, MacdTesterError> {
    let mut profit_rates = Vec::new();
    let mut successes = 0usize;
    let mut trades = 0usize;

    for total in period_trades(market) {
        if total.len() > 1 {
            tracing::warn!(
                trades = total.len(),
                "period produced more than one trade; profit rate is their mean"
            );
        }
        let profit_rate = total.profit_rate(&market.prices)?;
        if profit_rate > 0.0 {
            successes += 1;
        }
        trades += total.len();
        profit_rates.push(profit_rate);
    }

    if profit_rates.is_empty() {
        return Ok(BacktestResult::default());
    }

    let groups = profit_rates.len() as f64;
    Ok(BacktestResult {
        success_rate: Some(successes as f64 / groups),
        profit_rate: Some(profit_rates.iter().sum::<f64>() / groups),
        trade_groups: profit_rates.len(),
        trades,
    })
}

/// Buy points of every trade, in date order.
pub fn collect_buy_points(market: &MarketSeries) -> Vec<NaiveDate> {
    let points: Vec<NaiveDate> = period_trades(market)
        .iter()
        .flat_map(|total| total.trades().iter().map(|t| t.buy_point()))
        .collect();
    tracing::debug!(count = points.len(), "collected buy points");
    points
}

/// Sell points of every trade, in date order.
pub fn collect_sell_points(market: &MarketSeries) -> Vec<NaiveDate> {
    let points: Vec<NaiveDate> = period_trades(market)
        .iter()
        .flat_map(|total| total.trades().iter().map(|t| t.sell_point()))
        .collect();
    tracing::debug!(count = points.len(), "collected sell points");
    points
}

fn period_trades(market: &MarketSeries) -> Vec<TotalTrade> {
    trading_periods(&market.macd, &market.signal_line)
        .iter()
        .filter_map(|period| {
            let up_point = starting_up_crossing(&market.macd, &market.signal_line, period);
            extract_trades(&market.macd, &market.modified_signal_line, period, up_point)
        })
        .collect()
}
