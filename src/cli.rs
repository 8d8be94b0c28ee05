//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::backtest::{collect_buy_points, collect_sell_points, BacktestParams};
use crate::domain::config_validation::{build_backtest_params, validate_backtest_config};
use crate::domain::error::MacdTesterError;
use crate::domain::universe::{
    parse_codes, prepare_market, resolve_universe, run_universe_backtest, UniverseError,
    UniverseResult,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "macdtester", about = "MACD modified signal line backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest every symbol in the universe
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        /// Modified signal line smoothing factor
        #[arg(short)]
        k: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the buy and sell points found for one symbol
    Points {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(short)]
        k: Option<f64>,
    },
    /// List the symbols a backtest would cover
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            code,
            k,
            output,
        } => run_backtest(&config, code.as_deref(), k, output.as_deref()),
        Command::Points { config, code, k } => run_points(&config, &code, k),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MacdTesterError> {
    FileConfigAdapter::from_file(path).map_err(|e| MacdTesterError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate the config, then build parameters with an optional
/// `k` override.
pub fn load_params(
    adapter: &dyn ConfigPort,
    k_override: Option<f64>,
) -> Result<BacktestParams, MacdTesterError> {
    validate_backtest_config(adapter)?;
    let mut params = build_backtest_params(adapter)?;
    if let Some(k) = k_override {
        if !k.is_finite() || k < 1.0 {
            return Err(MacdTesterError::ConfigInvalid {
                section: "backtest".into(),
                key: "k".into(),
                reason: "k must be at least 1".into(),
            });
        }
        params.k = k;
    }
    Ok(params)
}

pub fn data_port_from_config(adapter: &dyn ConfigPort) -> Result<CsvAdapter, MacdTesterError> {
    let directory =
        adapter
            .get_string("data", "directory")
            .ok_or_else(|| MacdTesterError::ConfigMissing {
                section: "data".into(),
                key: "directory".into(),
            })?;
    Ok(CsvAdapter::new(PathBuf::from(directory.trim())))
}

/// `--code` wins, then `[backtest] codes`, then every listed symbol minus
/// `[backtest] ignore`.
pub fn resolve_symbols(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, MacdTesterError> {
    if let Some(code) = code_override {
        return Ok(parse_codes(code)?);
    }

    if let Some(codes) = config
        .get_string("backtest", "codes")
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(parse_codes(&codes)?);
    }

    let ignore = config.get_list("backtest", "ignore");
    resolve_universe(data_port, &ignore)
}

fn run_backtest(
    config_path: &Path,
    code_override: Option<&str>,
    k_override: Option<f64>,
    output_override: Option<&Path>,
) -> Result<(), MacdTesterError> {
    // Stage 1: Load and validate config
    tracing::info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;
    let params = load_params(&adapter, k_override)?;

    // Stage 2: Resolve universe
    let data_port = data_port_from_config(&adapter)?;
    let symbols = resolve_symbols(code_override, &adapter, &data_port)?;

    // Stage 3: Resolve report destination
    let output = output_override
        .map(|p| p.display().to_string())
        .or_else(|| adapter.get_string("report", "output"));
    let reporter = HtmlReportAdapter::new();
    let report = output
        .as_deref()
        .map(|path| (&reporter as &dyn ReportPort, path));

    run_backtest_pipeline(&data_port, report, &symbols, &params).map(|_| ())
}

/// Stages 4-6: run the universe, print the summary, write the report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: Option<(&dyn ReportPort, &str)>,
    symbols: &[String],
    params: &BacktestParams,
) -> Result<UniverseResult, MacdTesterError> {
    // Stage 4: Run backtest
    eprintln!(
        "Running backtest: {} symbols, MACD({},{},{}), K = {}",
        symbols.len(),
        params.fast_period,
        params.slow_period,
        params.signal_period,
        params.k,
    );
    let result = run_universe_backtest(data_port, symbols, params)?;

    // Stage 5: Print console summary to stderr
    print_summary(&result);

    // Stage 6: Generate report
    if let Some((reporter, path)) = report {
        reporter.write(&result, params, path)?;
        eprintln!("\nReport written to: {}", path);
    }

    Ok(result)
}

fn format_rate(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn print_summary(result: &UniverseResult) {
    eprintln!("\n=== Per-Symbol Results ===");
    for s in &result.symbols {
        eprintln!(
            "  {:<8} {:>3} trades, success {:>8}, profit {:>8}",
            s.symbol,
            s.result.trades,
            format_rate(s.result.success_rate),
            format_rate(s.result.profit_rate),
        );
    }

    eprintln!("\n=== Universe Results ===");
    eprintln!(
        "Symbols tested:   {} of {}",
        result.tested(),
        result.symbols.len()
    );
    eprintln!("Avg Success Rate: {}", format_rate(result.avg_success_rate));
    eprintln!("Avg Profit Rate:  {}", format_rate(result.avg_profit_rate));
}

fn run_points(
    config_path: &Path,
    code: &str,
    k_override: Option<f64>,
) -> Result<(), MacdTesterError> {
    let adapter = load_config(config_path)?;
    let params = load_params(&adapter, k_override)?;
    let data_port = data_port_from_config(&adapter)?;

    let symbol = code.trim().to_uppercase();
    let (buys, sells) = trade_points(&data_port, &symbol, &params)?;

    for date in &buys {
        println!("BUY  {}", date);
    }
    for date in &sells {
        println!("SELL {}", date);
    }
    eprintln!("{}: {} buy points, {} sell points", symbol, buys.len(), sells.len());
    Ok(())
}

/// Buy and sell points for one symbol after indicator preparation.
pub fn trade_points(
    data_port: &dyn DataPort,
    symbol: &str,
    params: &BacktestParams,
) -> Result<(Vec<chrono::NaiveDate>, Vec<chrono::NaiveDate>), MacdTesterError> {
    let prices = data_port.fetch_prices(symbol)?;
    match prepare_market(&prices, params)? {
        Some(market) => Ok((collect_buy_points(&market), collect_sell_points(&market))),
        None => {
            tracing::warn!(symbol, "series too short to survive the warm-up window");
            Ok((Vec::new(), Vec::new()))
        }
    }
}

fn run_list_symbols(config_path: &Path) -> Result<(), MacdTesterError> {
    let adapter = load_config(config_path)?;
    let data_port = data_port_from_config(&adapter)?;
    let symbols = resolve_symbols(None, &adapter, &data_port)?;

    if symbols.is_empty() {
        return Err(UniverseError::EmptyUniverse.into());
    }
    for symbol in &symbols {
        println!("{}", symbol);
    }
    eprintln!("{} symbols found", symbols.len());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), MacdTesterError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    let params = load_params(&adapter, None)?;

    eprintln!(
        "  MACD({},{},{}), K = {}, warm-up = {}",
        params.fast_period, params.slow_period, params.signal_period, params.k, params.warmup
    );
    let ignore = adapter.get_list("backtest", "ignore");
    if !ignore.is_empty() {
        eprintln!("  ignoring: {}", ignore.join(", "));
    }
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
