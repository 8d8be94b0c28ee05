//! Integration tests.
//!
//! Tests cover:
//! - Worked single-period example through the public backtest entry point
//! - Universe runner with a mock data port (null symbols, failures)
//! - Warm-up trimming and indicator preparation
//! - Buy/sell point diagnostics

mod common;

use approx::assert_relative_eq;
use common::*;
use macdtester::domain::backtest::{
    collect_buy_points, collect_sell_points, run_backtest, run_market_backtest, BacktestParams,
    BacktestResult,
};
use macdtester::domain::error::MacdTesterError;
use macdtester::domain::extractor::extract_trades;
use macdtester::domain::period::{starting_up_crossing, trading_periods};
use macdtester::domain::series::MarketSeries;
use macdtester::domain::trade::Trade;
use macdtester::domain::universe::{
    prepare_market, resolve_universe, run_symbol_backtest, run_universe_backtest, UniverseError,
};

mod worked_examples {
    use super::*;

    #[test]
    fn single_trade_between_up_and_down_crossing() {
        let prices = series(&[10.0, 9.0, 8.0, 9.0, 10.0, 12.0, 11.0]);
        let macd = series(&[1.0, 3.0, 4.0, 3.0, 1.0, 0.5, 0.5]);
        let signal = series(&[2.0; 7]);

        let periods = trading_periods(&macd, &signal);
        let up = starting_up_crossing(&macd, &signal, &periods[1]);
        assert_eq!(up, Some(day(1)));

        let total = extract_trades(&macd, &signal, &periods[1], up).unwrap();
        assert_eq!(total.trades(), &[Trade::new(day(1), day(4))]);
        assert_eq!(total.trades()[0].capital(), 1.0);

        let result = run_backtest(&prices, &macd, &signal, &signal).unwrap();
        assert_eq!(result.success_rate, Some(1.0));
        assert_relative_eq!(result.profit_rate.unwrap(), 1.0 / 9.0);
    }

    #[test]
    fn no_down_crossing_after_buy_gives_no_trade() {
        let prices = series(&[10.0, 9.0, 8.0, 9.0, 10.0, 12.0, 11.0]);
        let macd = series(&[1.0, 3.0, 4.0, 3.0, 1.0, 0.5, 0.5]);
        let signal = series(&[2.0; 7]);
        // MACD up-crosses it on day 1 and never drops back below it.
        let modified = series(&[2.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let result = run_backtest(&prices, &macd, &signal, &modified).unwrap();
        assert_eq!(result, BacktestResult::default());
    }

    #[test]
    fn misaligned_prices_rejected_before_scanning() {
        let prices = series(&[10.0, 9.0, 8.0]);
        let macd = series(&[1.0, 3.0, 1.0, 0.5]);
        let signal = series(&[2.0; 4]);

        let err = run_backtest(&prices, &macd, &signal, &signal).unwrap_err();
        assert!(matches!(err, MacdTesterError::MisalignedSeries { .. }));
    }
}

mod universe_runner {
    use super::*;

    #[test]
    fn short_symbol_is_null_and_excluded_from_averages() {
        let port = MockDataPort::new()
            .with_prices("WAVE", wave_prices(300, 100.0))
            .with_prices("TINY", rising_prices(10, 50.0));
        let params = BacktestParams::default();
        let symbols = vec!["TINY".to_string(), "WAVE".to_string()];

        let universe = run_universe_backtest(&port, &symbols, &params).unwrap();

        let tiny = &universe.symbols[0];
        assert_eq!(tiny.symbol, "TINY");
        assert_eq!(tiny.result, BacktestResult::default());

        let wave = &universe.symbols[1];
        assert!(wave.result.trades > 0);
        assert_eq!(universe.tested(), 1);
        assert_eq!(universe.avg_success_rate, wave.result.success_rate);
        assert_eq!(universe.avg_profit_rate, wave.result.profit_rate);
    }

    #[test]
    fn symbol_result_matches_direct_backtest() {
        let prices = wave_prices(250, 80.0);
        let port = MockDataPort::new().with_prices("WAVE", prices.clone());
        let params = BacktestParams {
            k: 2.0,
            ..BacktestParams::default()
        };

        let via_runner = run_symbol_backtest(&port, "WAVE", &params).unwrap();
        let market = prepare_market(&prices, &params).unwrap().unwrap();
        let direct = run_market_backtest(&market).unwrap();

        assert_eq!(via_runner.result, direct);
        assert_eq!(via_runner.bars, market.len());
    }

    #[test]
    fn data_port_failure_propagates() {
        let port = MockDataPort::new()
            .with_prices("WAVE", wave_prices(200, 100.0))
            .with_error("BROKEN", "disk on fire");
        let symbols = vec!["BROKEN".to_string(), "WAVE".to_string()];

        let err = run_universe_backtest(&port, &symbols, &BacktestParams::default()).unwrap_err();
        assert!(matches!(
            err,
            MacdTesterError::DataSource { ref reason } if reason == "disk on fire"
        ));
    }

    #[test]
    fn empty_universe_is_an_error() {
        let port = MockDataPort::new();
        let err = run_universe_backtest(&port, &[], &BacktestParams::default()).unwrap_err();
        assert!(matches!(
            err,
            MacdTesterError::Universe(UniverseError::EmptyUniverse)
        ));
    }

    #[test]
    fn resolve_universe_drops_ignored_symbols() {
        let port = MockDataPort::new()
            .with_prices("PTT", rising_prices(5, 1.0))
            .with_prices("BANPU", rising_prices(5, 1.0))
            .with_prices("AOT", rising_prices(5, 1.0));

        let symbols = resolve_universe(&port, &["banpu".to_string()]).unwrap();
        assert_eq!(symbols, vec!["AOT", "PTT"]);
    }
}

mod indicator_preparation {
    use super::*;

    #[test]
    fn warmup_is_at_least_first_valid_indicator_point() {
        let prices = wave_prices(100, 100.0);
        let params = BacktestParams::default();

        let market = prepare_market(&prices, &params).unwrap().unwrap();

        // slow - 1 + signal - 1 = 33 > configured warm-up of 25
        assert_eq!(market.len(), 100 - 33);
        assert_eq!(market.prices.first_date(), Some(day(33)));
        assert!(market.macd.shares_index_with(&market.prices));
        assert!(market.modified_signal_line.shares_index_with(&market.prices));
    }

    #[test]
    fn larger_configured_warmup_wins() {
        let prices = wave_prices(100, 100.0);
        let params = BacktestParams {
            warmup: 50,
            ..BacktestParams::default()
        };

        let market = prepare_market(&prices, &params).unwrap().unwrap();
        assert_eq!(market.len(), 50);
    }

    #[test]
    fn k_of_one_makes_modified_equal_signal() {
        let market = prepare_market(&wave_prices(120, 100.0), &BacktestParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(market.modified_signal_line, market.signal_line);
    }

    #[test]
    fn too_short_series_yields_none() {
        let prices = rising_prices(33, 10.0);
        assert!(prepare_market(&prices, &BacktestParams::default())
            .unwrap()
            .is_none());
    }
}

mod diagnostics {
    use super::*;

    fn wave_market() -> MarketSeries {
        prepare_market(&wave_prices(300, 100.0), &BacktestParams::default())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn buy_and_sell_points_pair_up() {
        let market = wave_market();
        let buys = collect_buy_points(&market);
        let sells = collect_sell_points(&market);

        assert_eq!(buys.len(), sells.len());
        assert!(!buys.is_empty());
        for (buy, sell) in buys.iter().zip(&sells) {
            assert!(buy < sell);
        }
        for pair in sells.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn segmented_periods_yield_one_trade_each() {
        // The starting up-crossing opens its period, so only the first date
        // can satisfy the buy bound.
        let market = wave_market();
        let result = run_market_backtest(&market).unwrap();
        assert!(result.trades > 0);
        assert_eq!(result.trade_groups, result.trades);
    }

    #[test]
    fn point_count_matches_backtest_trade_count() {
        let market = wave_market();
        let result = run_market_backtest(&market).unwrap();
        assert_eq!(collect_buy_points(&market).len(), result.trades);
    }
}
