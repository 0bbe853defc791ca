//! Core domain types and decision logic.

pub mod bar;
pub mod signal;
pub mod indicator;
pub mod analyzer;
pub mod sizing;
pub mod stops;
pub mod risk;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
