//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::backtest::{BacktestParams, DEFAULT_WARMUP};
use crate::domain::error::MacdTesterError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    validate_data_directory(config)?;
    validate_k(config)?;
    validate_periods(config)?;
    validate_warmup(config)?;
    validate_codes(config)?;
    Ok(())
}

/// Build backtest parameters, falling back to the defaults for absent keys.
pub fn build_backtest_params(config: &dyn ConfigPort) -> Result<BacktestParams, MacdTesterError> {
    validate_k(config)?;
    validate_periods(config)?;
    validate_warmup(config)?;

    Ok(BacktestParams {
        k: config.get_double("backtest", "k", 1.0),
        fast_period: config.get_int("backtest", "fast_period", DEFAULT_FAST as i64) as usize,
        slow_period: config.get_int("backtest", "slow_period", DEFAULT_SLOW as i64) as usize,
        signal_period: config.get_int("backtest", "signal_period", DEFAULT_SIGNAL as i64)
            as usize,
        warmup: config.get_int("backtest", "warmup", DEFAULT_WARMUP as i64) as usize,
    })
}

fn invalid(key: &str, reason: &str) -> MacdTesterError {
    MacdTesterError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `[backtest] key` when present. A value that does not parse is an
/// error rather than a silent fallback to the default.
fn parsed<T: FromStr>(config: &dyn ConfigPort, key: &str) -> Result<Option<T>, MacdTesterError> {
    match config.get_string("backtest", key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            invalid(key, &format!("{key} must be a number, got {:?}", raw.trim()))
        }),
        None => Ok(None),
    }
}

fn validate_data_directory(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    match config.get_string("data", "directory") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(MacdTesterError::ConfigMissing {
            section: "data".to_string(),
            key: "directory".to_string(),
        }),
    }
}

fn validate_k(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    let k = parsed::<f64>(config, "k")?.unwrap_or(1.0);
    if !k.is_finite() || k < 1.0 {
        return Err(invalid("k", "k must be at least 1"));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    let fast = parsed::<i64>(config, "fast_period")?.unwrap_or(DEFAULT_FAST as i64);
    let slow = parsed::<i64>(config, "slow_period")?.unwrap_or(DEFAULT_SLOW as i64);
    let signal = parsed::<i64>(config, "signal_period")?.unwrap_or(DEFAULT_SIGNAL as i64);

    if fast < 1 {
        return Err(invalid("fast_period", "fast_period must be at least 1"));
    }
    if slow < 1 {
        return Err(invalid("slow_period", "slow_period must be at least 1"));
    }
    if signal < 1 {
        return Err(invalid("signal_period", "signal_period must be at least 1"));
    }
    if fast >= slow {
        return Err(invalid(
            "fast_period",
            "fast_period must be less than slow_period",
        ));
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    if parsed::<i64>(config, "warmup")?.unwrap_or(DEFAULT_WARMUP as i64) < 0 {
        return Err(invalid("warmup", "warmup must be non-negative"));
    }
    Ok(())
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), MacdTesterError> {
    match config.get_string("backtest", "codes") {
        Some(codes) if !codes.trim().is_empty() => {
            parse_codes(&codes).map_err(|e| invalid("codes", &e.to_string()))?;
            Ok(())
        }
        _ => Ok(()),
    }
}
