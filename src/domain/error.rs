//! Domain error types.

use crate::domain::universe::UniverseError;
use chrono::NaiveDate;

/// Top-level error type for macdtester.
#[derive(Debug, thiserror::Error)]
pub enum MacdTesterError {
    #[error("date {date} is not present in the {series} series")]
    InvalidIndex { date: NaiveDate, series: String },

    #[error("misaligned {series} series: {reason}")]
    MisalignedSeries { series: String, reason: String },

    #[error("invalid series: {reason}")]
    InvalidSeries { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MacdTesterError> for std::process::ExitCode {
    fn from(err: &MacdTesterError) -> Self {
        let code: u8 = match err {
            MacdTesterError::Io(_) | MacdTesterError::Report { .. } => 1,
            MacdTesterError::ConfigParse { .. }
            | MacdTesterError::ConfigMissing { .. }
            | MacdTesterError::ConfigInvalid { .. } => 2,
            MacdTesterError::DataSource { .. } => 3,
            MacdTesterError::InvalidIndex { .. }
            | MacdTesterError::MisalignedSeries { .. }
            | MacdTesterError::InvalidSeries { .. } => 4,
            MacdTesterError::Universe(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
