//! CSV file price adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row. The
//! `date` (YYYY-MM-DD) and `close` columns are located by name; other
//! columns are ignored.

use crate::domain::error::MacdTesterError;
use crate::domain::series::TimeSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, MacdTesterError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| MacdTesterError::DataSource {
            reason: format!("missing {} column", name),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<TimeSeries, MacdTesterError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MacdTesterError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| MacdTesterError::DataSource {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let date_col = column(&headers, "date")?;
        let close_col = column(&headers, "close")?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| MacdTesterError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| MacdTesterError::DataSource {
                reason: "missing date value".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                MacdTesterError::DataSource {
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            let close: f64 = record
                .get(close_col)
                .ok_or_else(|| MacdTesterError::DataSource {
                    reason: "missing close value".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| MacdTesterError::DataSource {
                    reason: format!("invalid close value on {}: {}", date, e),
                })?;

            points.push((date, close));
        }

        points.sort_by_key(|&(date, _)| date);
        TimeSeries::new(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacdTesterError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MacdTesterError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MacdTesterError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
