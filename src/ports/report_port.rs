//! Report generation port trait.

use crate::domain::backtest::BacktestParams;
use crate::domain::error::MacdTesterError;
use crate::domain::universe::UniverseResult;

/// Port for writing universe backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &UniverseResult,
        params: &BacktestParams,
        output_path: &str,
    ) -> Result<(), MacdTesterError>;
}
