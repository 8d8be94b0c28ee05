//! Universe module for multi-symbol backtesting.
//!
//! Resolves the symbol list, prepares each symbol's aligned indicator
//! series, runs the per-symbol backtest and averages the non-null results.

use crate::domain::backtest::{run_market_backtest, BacktestParams, BacktestResult};
use crate::domain::error::MacdTesterError;
use crate::domain::indicator::macd::macd_and_signal_line;
use crate::domain::indicator::modified_signal::modified_signal_line;
use crate::domain::series::{MarketSeries, TimeSeries};
use crate::ports::data_port::DataPort;
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("no symbols left to test")]
    EmptyUniverse,
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Every symbol the data port lists, minus `ignore` (case-insensitive).
pub fn resolve_universe(
    data_port: &dyn DataPort,
    ignore: &[String],
) -> Result<Vec<String>, MacdTesterError> {
    let ignored: HashSet<String> = ignore.iter().map(|s| s.trim().to_uppercase()).collect();
    let mut symbols: Vec<String> = data_port
        .list_symbols()?
        .into_iter()
        .filter(|s| !ignored.contains(&s.to_uppercase()))
        .collect();
    symbols.sort();
    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolResult {
    pub symbol: String,
    /// Bars left after the warm-up window was dropped.
    pub bars: usize,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniverseResult {
    pub avg_success_rate: Option<f64>,
    pub avg_profit_rate: Option<f64>,
    pub symbols: Vec<SymbolResult>,
}

impl UniverseResult {
    /// Average the non-null per-symbol rates; null symbols are kept in
    /// `symbols` but never counted as zero.
    pub fn from_symbols(symbols: Vec<SymbolResult>) -> Self {
        let success: Vec<f64> = symbols.iter().filter_map(|s| s.result.success_rate).collect();
        let profit: Vec<f64> = symbols.iter().filter_map(|s| s.result.profit_rate).collect();
        Self {
            avg_success_rate: mean(&success),
            avg_profit_rate: mean(&profit),
            symbols,
        }
    }

    /// Symbols that produced at least one trade.
    pub fn tested(&self) -> usize {
        self.symbols.iter().filter(|s| s.result.has_trades()).count()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Compute MACD, signal and modified signal lines for `prices` and drop the
/// warm-up window. Returns `None` when nothing survives the warm-up.
pub fn prepare_market(
    prices: &TimeSeries,
    params: &BacktestParams,
) -> Result<Option<MarketSeries>, MacdTesterError> {
    let lines = macd_and_signal_line(
        prices,
        params.fast_period,
        params.slow_period,
        params.signal_period,
    )?;

    let skip = params.warmup.max(lines.first_valid);
    if skip >= prices.len() {
        return Ok(None);
    }

    // The modified line is seeded at the first valid signal value, not at
    // the end of the warm-up window.
    let macd = lines.macd.skip(lines.first_valid);
    let signal_line = lines.signal_line.skip(lines.first_valid);
    let modified = modified_signal_line(&macd, &signal_line, params.k)?;

    let trim = skip - lines.first_valid;
    MarketSeries::new(
        prices.skip(skip),
        macd.skip(trim),
        signal_line.skip(trim),
        modified.skip(trim),
    )
    .map(Some)
}

pub fn run_symbol_backtest(
    data_port: &dyn DataPort,
    symbol: &str,
    params: &BacktestParams,
) -> Result<SymbolResult, MacdTesterError> {
    let prices = data_port.fetch_prices(symbol)?;
    tracing::info!(symbol, bars = prices.len(), "testing symbol");

    let Some(market) = prepare_market(&prices, params)? else {
        tracing::warn!(
            symbol,
            bars = prices.len(),
            "series too short to survive the warm-up window"
        );
        return Ok(SymbolResult {
            symbol: symbol.to_string(),
            bars: 0,
            result: BacktestResult::default(),
        });
    };

    let result = run_market_backtest(&market)?;
    tracing::debug!(
        symbol,
        trades = result.trades,
        success_rate = ?result.success_rate,
        profit_rate = ?result.profit_rate,
        "symbol done"
    );

    Ok(SymbolResult {
        symbol: symbol.to_string(),
        bars: market.len(),
        result,
    })
}

pub fn run_universe_backtest(
    data_port: &dyn DataPort,
    symbols: &[String],
    params: &BacktestParams,
) -> Result<UniverseResult, MacdTesterError> {
    if symbols.is_empty() {
        return Err(UniverseError::EmptyUniverse.into());
    }

    let mut results = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        results.push(run_symbol_backtest(data_port, symbol, params)?);
    }

    let universe = UniverseResult::from_symbols(results);
    tracing::info!(
        symbols = universe.symbols.len(),
        tested = universe.tested(),
        "universe backtest complete"
    );
    Ok(universe)
}
