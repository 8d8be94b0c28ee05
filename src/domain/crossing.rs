//! Crossing detection between two date-aligned series.
//!
//! - Up-crossing at `t`: `fast[t] >= slow[t]` and `fast[t-1] < slow[t-1]`
//! - Down-crossing at `t`: `fast[t] <= slow[t]` and `fast[t-1] > slow[t-1]`
//!
//! `t-1` is the previous date in `fast`'s index. Both predicates return
//! `false` at the first date or when either series lacks a needed date.

use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

struct CrossingWindow {
    fast_curr: f64,
    slow_curr: f64,
    fast_prev: f64,
    slow_prev: f64,
}

fn window(fast: &TimeSeries, slow: &TimeSeries, t: NaiveDate) -> Option<CrossingWindow> {
    let prev = fast.previous(t)?;
    Some(CrossingWindow {
        fast_curr: fast.get(t)?,
        slow_curr: slow.get(t)?,
        fast_prev: fast.get(prev)?,
        slow_prev: slow.get(prev)?,
    })
}

pub fn is_up_crossing(fast: &TimeSeries, slow: &TimeSeries, t: NaiveDate) -> bool {
    window(fast, slow, t)
        .map(|w| w.fast_curr >= w.slow_curr && w.fast_prev < w.slow_prev)
        .unwrap_or(false)
}

pub fn is_down_crossing(fast: &TimeSeries, slow: &TimeSeries, t: NaiveDate) -> bool {
    window(fast, slow, t)
        .map(|w| w.fast_curr <= w.slow_curr && w.fast_prev > w.slow_prev)
        .unwrap_or(false)
}
