//! Trade extraction within a single trading period.
//!
//! The period is scanned once in date order with two states:
//!
//! - idle: `t` becomes the buy point when its position is no later than the
//!   period's starting up-crossing and MACD up-crosses the modified signal
//!   line at `t`
//! - bought: `t` becomes the sell point when MACD down-crosses the modified
//!   signal line at `t`; the trade is emitted and the state resets
//!
//! The sell check runs on the same `t` that produced the buy. Because the
//! buy bound is fixed per period, once a trade closes every later idle date
//! lies past the starting up-crossing, so at most one trade qualifies per
//! period in practice.

use crate::domain::crossing::{is_down_crossing, is_up_crossing};
use crate::domain::period::TradingPeriod;
use crate::domain::series::TimeSeries;
use crate::domain::trade::{TotalTrade, Trade};
use chrono::NaiveDate;

enum ScanState {
    Idle,
    Bought(NaiveDate),
}

fn is_buy_point(
    macd: &TimeSeries,
    modified_signal_line: &TimeSeries,
    up_position: usize,
    t: NaiveDate,
) -> bool {
    match macd.position(t) {
        Some(i) => i <= up_position && is_up_crossing(macd, modified_signal_line, t),
        None => false,
    }
}

/// Trades found in `period`, or `None` when there are none. A period
/// without a starting up-crossing never produces a buy.
pub fn extract_trades(
    macd: &TimeSeries,
    modified_signal_line: &TimeSeries,
    period: &TradingPeriod,
    up_point: Option<NaiveDate>,
) -> Option<TotalTrade> {
    let up_position = macd.position(up_point?)?;

    let mut trades = Vec::new();
    let mut state = ScanState::Idle;

    for &t in period.dates() {
        if let ScanState::Idle = state {
            if is_buy_point(macd, modified_signal_line, up_position, t) {
                state = ScanState::Bought(t);
            }
        }
        if let ScanState::Bought(buy_point) = state {
            if is_down_crossing(macd, modified_signal_line, t) {
                trades.push(Trade::new(buy_point, t));
                state = ScanState::Idle;
            }
        }
    }

    TotalTrade::new(trades)
}
