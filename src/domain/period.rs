//! Trading period segmentation.
//!
//! The shared date index is cut into contiguous, disjoint periods using the
//! crossings of the MACD line over its signal line:
//!
//! - an up-crossing opens a new period and belongs to it
//! - a down-crossing closes the current period and belongs to it; the next
//!   date opens a new period
//!
//! A boundary never produces an empty period, so an up-crossing directly
//! after a down-crossing simply starts the period the down-crossing opened.

use crate::domain::crossing::{is_down_crossing, is_up_crossing};
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPeriod {
    dates: Vec<NaiveDate>,
}

impl TradingPeriod {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn trading_periods(fast: &TimeSeries, slow: &TimeSeries) -> Vec<TradingPeriod> {
    let mut periods = Vec::new();
    let mut current: Vec<NaiveDate> = Vec::new();

    for &t in fast.dates() {
        if !current.is_empty() && is_up_crossing(fast, slow, t) {
            periods.push(TradingPeriod::new(mem::take(&mut current)));
        }
        current.push(t);
        if is_down_crossing(fast, slow, t) {
            periods.push(TradingPeriod::new(mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        periods.push(TradingPeriod::new(current));
    }
    periods
}

/// First up-crossing of `fast` over `slow` inside `period`, in date order.
pub fn starting_up_crossing(
    fast: &TimeSeries,
    slow: &TimeSeries,
    period: &TradingPeriod,
) -> Option<NaiveDate> {
    period
        .dates()
        .iter()
        .copied()
        .find(|&t| is_up_crossing(fast, slow, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (d(i as u32 + 1), v))
                .collect(),
        )
        .unwrap()
    }

    fn days(period: &TradingPeriod) -> Vec<u32> {
        use chrono::Datelike;
        period.dates().iter().map(|d| d.day()).collect()
    }

    #[test]
    fn empty_series_has_no_periods() {
        let s = series(&[]);
        assert!(trading_periods(&s, &s).is_empty());
    }

    #[test]
    fn no_crossings_is_one_period() {
        let fast = series(&[1.0, 1.5, 1.2, 1.1]);
        let slow = series(&[2.0, 2.0, 2.0, 2.0]);
        let periods = trading_periods(&fast, &slow);
        assert_eq!(periods.len(), 1);
        assert_eq!(days(&periods[0]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn up_crossing_opens_and_down_crossing_closes() {
        // up at day 2, down at day 5
        let fast = series(&[1.0, 3.0, 4.0, 3.0, 1.0, 0.5, 0.5]);
        let slow = series(&[2.0; 7]);
        let periods = trading_periods(&fast, &slow);
        let spans: Vec<Vec<u32>> = periods.iter().map(days).collect();
        assert_eq!(spans, vec![vec![1], vec![2, 3, 4, 5], vec![6, 7]]);
    }

    #[test]
    fn up_crossing_right_after_down_crossing_does_not_create_empty_period() {
        // up at day 2, down at day 3, up at day 4
        let fast = series(&[1.0, 3.0, 1.0, 3.0, 3.0]);
        let slow = series(&[2.0; 5]);
        let periods = trading_periods(&fast, &slow);
        let spans: Vec<Vec<u32>> = periods.iter().map(days).collect();
        assert_eq!(spans, vec![vec![1], vec![2, 3], vec![4, 5]]);
    }

    #[test]
    fn down_crossing_on_last_date_leaves_no_trailing_period() {
        let fast = series(&[3.0, 3.0, 1.0]);
        let slow = series(&[2.0; 3]);
        let periods = trading_periods(&fast, &slow);
        assert_eq!(periods.len(), 1);
        assert_eq!(days(&periods[0]), vec![1, 2, 3]);
    }

    #[test]
    fn starting_up_crossing_found() {
        let fast = series(&[1.0, 3.0, 4.0, 1.0]);
        let slow = series(&[2.0; 4]);
        let periods = trading_periods(&fast, &slow);
        assert_eq!(starting_up_crossing(&fast, &slow, &periods[0]), None);
        assert_eq!(starting_up_crossing(&fast, &slow, &periods[1]), Some(d(2)));
    }

    #[test]
    fn starting_up_crossing_none_for_period_opened_by_down_crossing() {
        let fast = series(&[3.0, 1.0, 0.5, 0.8]);
        let slow = series(&[2.0; 4]);
        let periods = trading_periods(&fast, &slow);
        assert_eq!(periods.len(), 2);
        assert_eq!(starting_up_crossing(&fast, &slow, &periods[1]), None);
    }
}
