//! quantrader — single-instrument decision and simulation engine.
//!
//! Hexagonal architecture: decision logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`]. The [`engine`]
//! module wires the pieces into one live decision cycle; [`cli`] drives
//! backtests and single-shot signals from the command line.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod engine;
pub mod cli;
