//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod crossing;
pub mod error;
pub mod extractor;
pub mod indicator;
pub mod period;
pub mod series;
pub mod trade;
pub mod universe;
