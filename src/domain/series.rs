//! Date-indexed series and the aligned market bundle consumed by the backtest.
//!
//! A [`TimeSeries`] keeps its dates strictly increasing and builds a
//! date-to-position table once, so positional comparisons between dates
//! ("does `t` come no later than the up-crossing?") are O(1).

use crate::domain::error::MacdTesterError;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    positions: HashMap<NaiveDate, usize>,
}

impl TimeSeries {
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self, MacdTesterError> {
        let (dates, values) = points.into_iter().unzip();
        Self::from_parts(dates, values)
    }

    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, MacdTesterError> {
        if dates.len() != values.len() {
            return Err(MacdTesterError::InvalidSeries {
                reason: format!("{} dates but {} values", dates.len(), values.len()),
            });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(MacdTesterError::InvalidSeries {
                reason: format!("dates not strictly increasing at {} -> {}", pair[0], pair[1]),
            });
        }

        let positions = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Ok(Self {
            dates,
            values,
            positions,
        })
    }

    /// Build a series over `dates` by applying `f` to each position. The
    /// index is reused as-is, so ordering has already been validated.
    pub fn map_index<F>(&self, f: F) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        Self {
            dates: self.dates.clone(),
            values: (0..self.dates.len()).map(f).collect(),
            positions: self.positions.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.positions.get(&date).copied()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|i| self.values[i])
    }

    /// The date immediately before `date` in this series' index.
    pub fn previous(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.position(date) {
            Some(i) if i > 0 => Some(self.dates[i - 1]),
            _ => None,
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Drop the first `n` points.
    pub fn skip(&self, n: usize) -> Self {
        let n = n.min(self.len());
        let dates: Vec<NaiveDate> = self.dates[n..].to_vec();
        let positions = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Self {
            dates,
            values: self.values[n..].to_vec(),
            positions,
        }
    }

    pub fn shares_index_with(&self, other: &TimeSeries) -> bool {
        self.dates == other.dates
    }
}

/// Prices plus the three indicator lines, all on one date index.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    pub prices: TimeSeries,
    pub macd: TimeSeries,
    pub signal_line: TimeSeries,
    pub modified_signal_line: TimeSeries,
}

impl MarketSeries {
    pub fn new(
        prices: TimeSeries,
        macd: TimeSeries,
        signal_line: TimeSeries,
        modified_signal_line: TimeSeries,
    ) -> Result<Self, MacdTesterError> {
        check_alignment(&prices, &macd, "macd")?;
        check_alignment(&prices, &signal_line, "signal line")?;
        check_alignment(&prices, &modified_signal_line, "modified signal line")?;
        Ok(Self {
            prices,
            macd,
            signal_line,
            modified_signal_line,
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

pub(crate) fn check_alignment(
    reference: &TimeSeries,
    other: &TimeSeries,
    name: &str,
) -> Result<(), MacdTesterError> {
    if reference.shares_index_with(other) {
        return Ok(());
    }

    let reason = if reference.len() != other.len() {
        format!("expected {} points, found {}", reference.len(), other.len())
    } else {
        match reference.dates().iter().zip(other.dates()).find(|(a, b)| a != b) {
            Some((expected, found)) => format!("expected date {expected}, found {found}"),
            None => "date index differs".to_string(),
        }
    };

    Err(MacdTesterError::MisalignedSeries {
        series: name.to_string(),
        reason,
    })
}
