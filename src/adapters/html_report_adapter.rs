//! HTML report adapter implementing ReportPort.
//!
//! Renders the per-symbol success/profit table and universe averages with an
//! Askama template.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestParams;
use crate::domain::error::MacdTesterError;
use crate::domain::universe::UniverseResult;
use crate::ports::report_port::ReportPort;

use askama::Template;

struct SymbolRow {
    symbol: String,
    bars: usize,
    trades: usize,
    success_rate: String,
    profit_rate: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    params: &'a BacktestParams,
    rows: Vec<SymbolRow>,
    tested: usize,
    total: usize,
    avg_success_rate: String,
    avg_profit_rate: String,
}

fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        result: &UniverseResult,
        params: &BacktestParams,
    ) -> Result<String, MacdTesterError> {
        let rows = result
            .symbols
            .iter()
            .map(|s| SymbolRow {
                symbol: s.symbol.clone(),
                bars: s.bars,
                trades: s.result.trades,
                success_rate: format_pct(s.result.success_rate),
                profit_rate: format_pct(s.result.profit_rate),
            })
            .collect();

        let template = ReportTemplate {
            params,
            rows,
            tested: result.tested(),
            total: result.symbols.len(),
            avg_success_rate: format_pct(result.avg_success_rate),
            avg_profit_rate: format_pct(result.avg_profit_rate),
        };

        template.render().map_err(|e| MacdTesterError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        result: &UniverseResult,
        params: &BacktestParams,
        output_path: &str,
    ) -> Result<(), MacdTesterError> {
        let html = self.render(result, params)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;

        Ok(())
    }
}
