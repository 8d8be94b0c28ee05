//! Modified signal line.
//!
//! Re-smooths the signal line with an exponential filter of span `k`:
//! alpha = 2/(k+1), M[0] = S[0], M[i] = S[i]*alpha + M[i-1]*(1-alpha).
//! `k = 1` reproduces the signal line; larger `k` lags it further, delaying
//! both the buy and the sell crossing against the MACD line.

use crate::domain::error::MacdTesterError;
use crate::domain::series::{check_alignment, TimeSeries};

pub fn modified_signal_line(
    macd: &TimeSeries,
    signal_line: &TimeSeries,
    k: f64,
) -> Result<TimeSeries, MacdTesterError> {
    if !k.is_finite() || k < 1.0 {
        return Err(MacdTesterError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "k".to_string(),
            reason: format!("smoothing factor must be a finite value >= 1, got {k}"),
        });
    }
    check_alignment(macd, signal_line, "signal line")?;

    let alpha = 2.0 / (k + 1.0);
    let signal = signal_line.values();
    let mut smoothed = Vec::with_capacity(signal.len());
    for (i, &s) in signal.iter().enumerate() {
        let value = match i {
            0 => s,
            _ => s * alpha + smoothed[i - 1] * (1.0 - alpha),
        };
        smoothed.push(value);
    }

    Ok(signal_line.map_index(|i| smoothed[i]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (NaiveDate::from_ymd_opt(2024, 1, i as u32 + 1).unwrap(), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn k_of_one_is_the_signal_line() {
        let macd = series(&[1.0, 2.0, 3.0]);
        let signal = series(&[0.5, 1.5, 1.0]);
        let modified = modified_signal_line(&macd, &signal, 1.0).unwrap();
        assert_eq!(modified, signal);
    }

    #[test]
    fn larger_k_smooths() {
        let macd = series(&[0.0, 0.0, 0.0]);
        let signal = series(&[1.0, 4.0, 4.0]);
        let modified = modified_signal_line(&macd, &signal, 3.0).unwrap();

        // alpha = 0.5
        assert_relative_eq!(modified.values()[0], 1.0);
        assert_relative_eq!(modified.values()[1], 2.5);
        assert_relative_eq!(modified.values()[2], 3.25);
    }

    #[test]
    fn rejects_k_below_one() {
        let s = series(&[1.0]);
        assert!(matches!(
            modified_signal_line(&s, &s, 0.5),
            Err(MacdTesterError::ConfigInvalid { .. })
        ));
        assert!(modified_signal_line(&s, &s, f64::NAN).is_err());
    }

    #[test]
    fn rejects_misaligned_inputs() {
        let macd = series(&[1.0, 2.0]);
        let signal = series(&[1.0]);
        assert!(matches!(
            modified_signal_line(&macd, &signal, 2.0),
            Err(MacdTesterError::MisalignedSeries { .. })
        ));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let s = series(&[]);
        assert!(modified_signal_line(&s, &s, 2.0).unwrap().is_empty());
    }
}
