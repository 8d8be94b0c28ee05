//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: slow - 1 + signal - 1 points

use crate::domain::error::MacdTesterError;
use crate::domain::indicator::{
    calculate_ema, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::series::TimeSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    prices: &TimeSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if prices.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let ema_fast = ema_raw_values(prices, fast);
    let ema_slow = ema_raw_values(prices, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let n = prices.len();
    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_line: Vec<f64> = vec![0.0; n];
    let macd_warmup = slow - 1;

    if macd_warmup + signal_period <= n {
        let sum: f64 = macd_line[macd_warmup..macd_warmup + signal_period].iter().sum();
        let mut signal_ema = sum / signal_period as f64;
        signal_line[macd_warmup + signal_period - 1] = signal_ema;

        for i in (macd_warmup + signal_period)..n {
            signal_ema = macd_line[i] * k + signal_ema * (1.0 - k);
            signal_line[i] = signal_ema;
        }
    }

    let signal_warmup = slow - 1 + signal_period - 1;

    let values = prices
        .dates()
        .iter()
        .enumerate()
        .map(|(i, &date)| IndicatorPoint {
            date,
            valid: i >= signal_warmup,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// MACD and signal line as two series on the price index.
#[derive(Debug, Clone)]
pub struct MacdLines {
    pub macd: TimeSeries,
    pub signal_line: TimeSeries,
    /// Position of the first point where both lines are valid.
    pub first_valid: usize,
}

pub fn macd_and_signal_line(
    prices: &TimeSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdLines, MacdTesterError> {
    if fast == 0 || slow == 0 || signal_period == 0 {
        return Err(MacdTesterError::InvalidSeries {
            reason: format!("MACD periods must be positive, got ({fast},{slow},{signal_period})"),
        });
    }

    let series = calculate_macd(prices, fast, slow, signal_period);
    let (line, signal): (Vec<f64>, Vec<f64>) = series
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Macd { line, signal, .. } => (line, signal),
            IndicatorValue::Simple(v) => (v, v),
        })
        .unzip();

    Ok(MacdLines {
        macd: prices.map_index(|i| line[i]),
        signal_line: prices.map_index(|i| signal[i]),
        first_valid: series.first_valid(),
    })
}

/// Extract raw f64 values from the EMA module, using 0.0 for warmup points.
fn ema_raw_values(prices: &TimeSeries, period: usize) -> Vec<f64> {
    calculate_ema(prices, period)
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Simple(v) => v,
            _ => 0.0,
        })
        .collect()
}
