//! Configuration validation.
//!
//! Every section is validated up front so a bad file fails fast with the
//! offending section and key, instead of surfacing mid-run. Missing keys
//! fall back to defaults and validate as such; only present-but-invalid
//! values are rejected.

use crate::domain::analyzer::StrategyMode;
use crate::domain::error::QuantraderError;
use crate::domain::sizing::SizingMethod;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), QuantraderError> {
    validate_backtest_section(config)?;
    validate_strategy_section(config)?;
    validate_sizing_section(config)?;
    validate_risk_section(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> QuantraderError {
    QuantraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), QuantraderError> {
    let capital = config.get_double("backtest", "initial_capital", 1_000_000.0);
    if capital <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "must be positive"));
    }

    let commission = config.get_double("backtest", "commission_rate", 0.0003);
    if !(0.0..1.0).contains(&commission) {
        return Err(invalid("backtest", "commission_rate", "must be in [0, 1)"));
    }

    let rf = config.get_double("backtest", "risk_free_rate", 0.03);
    if !(0.0..1.0).contains(&rf) {
        return Err(invalid("backtest", "risk_free_rate", "must be in [0, 1)"));
    }
    Ok(())
}

pub fn validate_strategy_section(config: &dyn ConfigPort) -> Result<(), QuantraderError> {
    if let Some(mode) = config.get_string("strategy", "mode") {
        if StrategyMode::parse(&mode).is_none() {
            return Err(invalid("strategy", "mode", "must be 'combined' or 'etf'"));
        }
    }

    let ma_short = config.get_int("strategy", "ma_short", 5);
    let ma_long = config.get_int("strategy", "ma_long", 20);
    if ma_short < 1 {
        return Err(invalid("strategy", "ma_short", "must be at least 1"));
    }
    if ma_long <= ma_short {
        return Err(invalid("strategy", "ma_long", "must exceed ma_short"));
    }

    let rsi_period = config.get_int("strategy", "rsi_period", 14);
    if rsi_period < 2 {
        return Err(invalid("strategy", "rsi_period", "must be at least 2"));
    }
    let oversold = config.get_double("strategy", "rsi_oversold", 30.0);
    let overbought = config.get_double("strategy", "rsi_overbought", 70.0);
    if !(0.0..100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "thresholds must be within 0..100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "must be below rsi_overbought",
        ));
    }

    let fast = config.get_int("strategy", "macd_fast", 12);
    let slow = config.get_int("strategy", "macd_slow", 26);
    let signal = config.get_int("strategy", "macd_signal", 9);
    if fast < 1 || signal < 1 {
        return Err(invalid("strategy", "macd_fast", "periods must be at least 1"));
    }
    if slow <= fast {
        return Err(invalid("strategy", "macd_slow", "must exceed macd_fast"));
    }

    let boll_period = config.get_int("strategy", "boll_period", 20);
    if boll_period < 2 {
        return Err(invalid("strategy", "boll_period", "must be at least 2"));
    }
    let boll_mult = config.get_double("strategy", "boll_stddev_mult", 2.0);
    if boll_mult <= 0.0 {
        return Err(invalid("strategy", "boll_stddev_mult", "must be positive"));
    }

    let volume_window = config.get_int("strategy", "volume_window", 10);
    if volume_window < 1 {
        return Err(invalid("strategy", "volume_window", "must be at least 1"));
    }
    let momentum_window = config.get_int("strategy", "momentum_window", 10);
    if momentum_window < 1 {
        return Err(invalid("strategy", "momentum_window", "must be at least 1"));
    }

    let threshold = config.get_double("strategy", "price_change_threshold", 2.0);
    if threshold <= 0.0 {
        return Err(invalid(
            "strategy",
            "price_change_threshold",
            "must be positive",
        ));
    }
    Ok(())
}

pub fn validate_sizing_section(config: &dyn ConfigPort) -> Result<(), QuantraderError> {
    if let Some(method) = config.get_string("sizing", "method") {
        if SizingMethod::parse(&method).is_none() {
            return Err(invalid(
                "sizing",
                "method",
                "must be one of fixed, percentage, kelly, atr",
            ));
        }
    }

    let trade_amount = config.get_double("sizing", "trade_amount", 100_000.0);
    if trade_amount <= 0.0 {
        return Err(invalid("sizing", "trade_amount", "must be positive"));
    }

    let base_ratio = config.get_double("sizing", "base_ratio", 0.30);
    if !(base_ratio > 0.0 && base_ratio <= 1.0) {
        return Err(invalid("sizing", "base_ratio", "must be in (0, 1]"));
    }

    let max_single = config.get_double("sizing", "max_single_position", 0.30);
    if !(max_single > 0.0 && max_single <= 1.0) {
        return Err(invalid("sizing", "max_single_position", "must be in (0, 1]"));
    }

    let avg_win = config.get_double("sizing", "avg_win", 0.15);
    let avg_loss = config.get_double("sizing", "avg_loss", 0.10);
    if avg_win <= 0.0 || avg_loss <= 0.0 {
        return Err(invalid("sizing", "avg_win", "averages must be positive"));
    }

    let atr_ratio = config.get_double("sizing", "atr_ratio", 0.02);
    if atr_ratio <= 0.0 {
        return Err(invalid("sizing", "atr_ratio", "must be positive"));
    }
    let risk_budget = config.get_double("sizing", "risk_budget_ratio", 0.01);
    if risk_budget <= 0.0 {
        return Err(invalid("sizing", "risk_budget_ratio", "must be positive"));
    }

    let lot_size = config.get_int("sizing", "lot_size", 100);
    if lot_size < 1 {
        return Err(invalid("sizing", "lot_size", "must be at least 1"));
    }
    Ok(())
}

pub fn validate_risk_section(config: &dyn ConfigPort) -> Result<(), QuantraderError> {
    let max_daily_loss = config.get_double("risk", "max_daily_loss", 0.05);
    if !(max_daily_loss > 0.0 && max_daily_loss < 1.0) {
        return Err(invalid("risk", "max_daily_loss", "must be in (0, 1)"));
    }

    let max_drawdown = config.get_double("risk", "max_drawdown", 0.15);
    if !(max_drawdown > 0.0 && max_drawdown < 1.0) {
        return Err(invalid("risk", "max_drawdown", "must be in (0, 1)"));
    }

    let max_single = config.get_double("risk", "max_single_position", 0.30);
    if !(max_single > 0.0 && max_single <= 1.0) {
        return Err(invalid("risk", "max_single_position", "must be in (0, 1]"));
    }

    let max_trades = config.get_int("risk", "max_daily_trades", 10);
    if max_trades < 1 {
        return Err(invalid("risk", "max_daily_trades", "must be at least 1"));
    }

    let stop_loss = config.get_double("risk", "stop_loss_ratio", 0.05);
    if !(stop_loss > 0.0 && stop_loss < 1.0) {
        return Err(invalid("risk", "stop_loss_ratio", "must be in (0, 1)"));
    }
    let take_profit = config.get_double("risk", "take_profit_ratio", 0.08);
    if !(take_profit > 0.0 && take_profit < 1.0) {
        return Err(invalid("risk", "take_profit_ratio", "must be in (0, 1)"));
    }
    Ok(())
}
