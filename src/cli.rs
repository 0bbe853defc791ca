//! Command-line interface.
//!
//! Progress and warnings go to stderr; results go to stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_audit_adapter::CsvAuditAdapter;
use crate::adapters::dry_run_broker::DryRunBroker;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analyzer::{
    BandAnalyzer, MomentumAnalyzer, SignalCombiner, StrategyMode, TechnicalAnalyzer,
    TechnicalConfig,
};
use crate::domain::backtest::{BacktestConfig, BacktestEngine, BacktestResult};
use crate::domain::config_validation::validate_config;
use crate::domain::error::QuantraderError;
use crate::domain::risk::{RiskController, RiskLimits};
use crate::domain::sizing::{PositionSizer, SizerConfig, SizingMethod};
use crate::domain::stops::StopPolicy;
use crate::engine::{AccountState, CycleOutcome, LiveEngine};
use crate::ports::config_port::ConfigPort;

#[derive(Parser)]
#[command(name = "quantrader", version, about = "Signal-driven trading engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a historical backtest for one instrument
    Backtest {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        /// Instrument code, e.g. 600000 or 510300
        #[arg(short, long)]
        instrument: String,
    },
    /// Run one live decision cycle with a dry-run broker
    Signal {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(short, long)]
        instrument: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
    },
    /// Show the effective strategy, sizing and risk settings
    Info {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Backtest { config, instrument } => cmd_backtest(&config, &instrument),
        Commands::Signal { config, instrument } => cmd_signal(&config, &instrument),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Info { config } => cmd_info(&config),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    eprintln!("Loading configuration from {}...", path.display());
    let config = FileConfigAdapter::from_file(path).map_err(|e| {
        let err = QuantraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("Error: {}", err);
        ExitCode::from(&err)
    })?;

    validate_config(&config).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(&e)
    })?;

    Ok(config)
}

fn fail(err: QuantraderError) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::from(&err)
}

/// Look up a key that has no usable default.
fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, QuantraderError> {
    config
        .get_string(section, key)
        .ok_or_else(|| QuantraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn cmd_backtest(config_path: &PathBuf, instrument: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let bars_dir = match require_string(&config, "data", "bars_dir") {
        Ok(dir) => dir,
        Err(e) => return fail(e),
    };
    eprintln!("Loading bars for {} from {}...", instrument, bars_dir);

    let data = CsvBarAdapter::new(PathBuf::from(bars_dir));
    let bars = match data_bars(&data, instrument) {
        Ok(bars) => bars,
        Err(e) => return fail(e),
    };
    eprintln!("Loaded {} bars", bars.len());

    eprintln!("Running backtest...");
    let engine = BacktestEngine::new(
        build_backtest_config(&config),
        Box::new(build_combiner(&config)),
        PositionSizer::new(build_sizer_config(&config)),
        build_stop_policy(&config),
    );
    let result = match engine.run(instrument, &bars) {
        Ok(result) => result,
        Err(e) => return fail(e),
    };

    print_backtest_summary(&result);
    ExitCode::SUCCESS
}

fn data_bars(
    data: &CsvBarAdapter,
    instrument: &str,
) -> Result<Vec<crate::domain::bar::PriceBar>, QuantraderError> {
    use crate::ports::data_port::MarketDataPort;
    data.get_bars(instrument, usize::MAX)
}

fn cmd_signal(config_path: &PathBuf, instrument: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let bars_dir = match require_string(&config, "data", "bars_dir") {
        Ok(dir) => dir,
        Err(e) => return fail(e),
    };
    let audit_dir = config
        .get_string("data", "audit_dir")
        .unwrap_or_else(|| "audit".to_string());

    let data = CsvBarAdapter::new(PathBuf::from(bars_dir));
    let mut audit = match CsvAuditAdapter::new(PathBuf::from(&audit_dir)) {
        Ok(audit) => audit,
        Err(e) => return fail(e),
    };
    let mut broker = DryRunBroker::new();

    let mode = strategy_mode(&config);
    let engine = LiveEngine::new(
        mode,
        build_combiner(&config),
        BandAnalyzer::new(),
        PositionSizer::new(build_sizer_config(&config)),
        build_stop_policy(&config),
        RiskController::new(build_risk_limits(&config)),
        config.get_double("backtest", "commission_rate", 0.0003),
    );

    let account =
        AccountState::flat(config.get_double("backtest", "initial_capital", 1_000_000.0));

    eprintln!("Running {} cycle for {}...", mode, instrument);
    let outcome = match engine.run_cycle(instrument, &account, &data, &mut broker, &mut audit) {
        Ok(outcome) => outcome,
        Err(e) => return fail(e),
    };

    match outcome {
        CycleOutcome::RiskBlocked(check) => {
            println!("Risk gate: {} ({}) - {}", check.level, check.action, check.detail);
            println!("No order submitted");
        }
        CycleOutcome::StopExit { order_id, trade } => {
            println!(
                "Stop exit: {} {} x {} @ {:.4} ({})",
                trade.side, trade.instrument, trade.volume, trade.price, trade.reason
            );
            println!("Order id: {}", order_id.0);
        }
        CycleOutcome::Traded {
            signal,
            order_id,
            trade,
        } => {
            println!(
                "Signal: {} (strength {:.2}) - {}",
                signal.kind, signal.strength, signal.rationale
            );
            println!(
                "Order: {} {} x {} @ {:.4}",
                trade.side, trade.instrument, trade.volume, trade.price
            );
            println!("Order id: {}", order_id.0);
        }
        CycleOutcome::NoAction { signal } => {
            println!(
                "Signal: {} (strength {:.2}) - {}",
                signal.kind, signal.strength, signal.rationale
            );
            println!("No order submitted");
        }
    }
    eprintln!("Audit trail written to {}", audit_dir);
    ExitCode::SUCCESS
}

fn cmd_validate(config_path: &PathBuf) -> ExitCode {
    match load_config(config_path) {
        Ok(_) => {
            println!("Configuration OK");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn cmd_info(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let backtest = build_backtest_config(&config);
    let sizing = build_sizer_config(&config);
    let stops = build_stop_policy(&config);
    let risk = RiskController::new(build_risk_limits(&config));
    let limits = risk.limits();

    println!("Strategy mode:       {}", strategy_mode(&config));
    println!("Initial capital:     {:.2}", backtest.initial_capital);
    println!("Commission rate:     {:.4}%", backtest.commission_rate * 100.0);
    println!("Sizing method:       {}", sizing.method);
    println!("Lot size:            {}", sizing.lot_size);
    println!("Stop loss:           {:.2}%", stops.stop_ratio * 100.0);
    println!("Take profit:         {:.2}%", stops.take_profit_ratio * 100.0);
    println!("Risk limits:");
    println!("  Max daily loss:      {:.2}%", limits.max_daily_loss * 100.0);
    println!("  Max drawdown:        {:.2}%", limits.max_drawdown * 100.0);
    println!(
        "  Max single position: {:.2}%",
        limits.max_single_position * 100.0
    );
    println!("  Max daily trades:    {}", limits.max_daily_trades);
    ExitCode::SUCCESS
}

fn strategy_mode(config: &dyn ConfigPort) -> StrategyMode {
    config
        .get_string("strategy", "mode")
        .as_deref()
        .and_then(StrategyMode::parse)
        .unwrap_or(StrategyMode::Combined)
}

fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", 1_000_000.0),
        commission_rate: config.get_double("backtest", "commission_rate", 0.0003),
        risk_free_rate: config.get_double("backtest", "risk_free_rate", 0.03),
    }
}

fn build_combiner(config: &dyn ConfigPort) -> SignalCombiner {
    let technical = TechnicalAnalyzer::new(TechnicalConfig {
        ma_short: config.get_int("strategy", "ma_short", 5) as usize,
        ma_long: config.get_int("strategy", "ma_long", 20) as usize,
        rsi_period: config.get_int("strategy", "rsi_period", 14) as usize,
        rsi_oversold: config.get_double("strategy", "rsi_oversold", 30.0),
        rsi_overbought: config.get_double("strategy", "rsi_overbought", 70.0),
        macd_fast: config.get_int("strategy", "macd_fast", 12) as usize,
        macd_slow: config.get_int("strategy", "macd_slow", 26) as usize,
        macd_signal: config.get_int("strategy", "macd_signal", 9) as usize,
        boll_period: config.get_int("strategy", "boll_period", 20) as usize,
        boll_stddev_mult_x100: (config.get_double("strategy", "boll_stddev_mult", 2.0) * 100.0)
            .round() as u32,
        volume_window: config.get_int("strategy", "volume_window", 10) as usize,
        price_change_threshold: config.get_double("strategy", "price_change_threshold", 2.0),
    });
    let momentum =
        MomentumAnalyzer::new(config.get_int("strategy", "momentum_window", 10) as usize);
    SignalCombiner::new(technical, momentum)
}

fn build_sizer_config(config: &dyn ConfigPort) -> SizerConfig {
    let method = config
        .get_string("sizing", "method")
        .as_deref()
        .and_then(SizingMethod::parse)
        .unwrap_or(SizingMethod::Percentage);
    SizerConfig {
        method,
        trade_amount: config.get_double("sizing", "trade_amount", 100_000.0),
        base_ratio: config.get_double("sizing", "base_ratio", 0.30),
        max_single_position: config.get_double("sizing", "max_single_position", 0.30),
        avg_win: config.get_double("sizing", "avg_win", 0.15),
        avg_loss: config.get_double("sizing", "avg_loss", 0.10),
        atr_ratio: config.get_double("sizing", "atr_ratio", 0.02),
        risk_budget_ratio: config.get_double("sizing", "risk_budget_ratio", 0.01),
        lot_size: config.get_int("sizing", "lot_size", 100),
    }
}

fn build_stop_policy(config: &dyn ConfigPort) -> StopPolicy {
    StopPolicy::new(
        config.get_double("risk", "stop_loss_ratio", 0.05),
        config.get_double("risk", "take_profit_ratio", 0.08),
    )
}

fn build_risk_limits(config: &dyn ConfigPort) -> RiskLimits {
    RiskLimits {
        max_daily_loss: config.get_double("risk", "max_daily_loss", 0.05),
        max_drawdown: config.get_double("risk", "max_drawdown", 0.15),
        max_single_position: config.get_double("risk", "max_single_position", 0.30),
        max_daily_trades: config.get_int("risk", "max_daily_trades", 10) as usize,
    }
}

fn print_backtest_summary(result: &BacktestResult) {
    println!(
        "Backtest Results for {} ({} to {})",
        result.instrument, result.start_date, result.end_date
    );
    println!("  Initial Capital:   {:.2}", result.initial_capital);
    println!("  Final Equity:      {:.2}", result.final_equity);
    println!("  Total Return:      {:.2}%", result.total_return * 100.0);
    println!(
        "  Annualized Return: {:.2}%",
        result.annualized_return * 100.0
    );
    println!("  Max Drawdown:      {:.2}%", result.max_drawdown * 100.0);
    println!("  Sharpe Ratio:      {:.2}", result.sharpe_ratio);
    println!(
        "  Trades:            {} ({} wins / {} losses, win rate {:.2}%)",
        result.trade_stats.total_trades,
        result.trade_stats.winning_trades,
        result.trade_stats.losing_trades,
        result.trade_stats.win_rate * 100.0
    );
    println!(
        "  Avg Win / Loss:    {:.2} / {:.2}",
        result.trade_stats.avg_win, result.trade_stats.avg_loss
    );
    if result.trade_stats.profit_factor.is_infinite() {
        println!("  Profit Factor:     inf");
    } else {
        println!("  Profit Factor:     {:.2}", result.trade_stats.profit_factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strategy_mode_is_combined() {
        let config = FileConfigAdapter::from_string("").unwrap();
        assert_eq!(strategy_mode(&config), StrategyMode::Combined);
    }

    #[test]
    fn builders_pick_up_overrides() {
        let config = FileConfigAdapter::from_string(
            r#"
[backtest]
initial_capital = 250000

[strategy]
mode = etf
ma_short = 3
ma_long = 15

[sizing]
method = fixed
lot_size = 200

[risk]
stop_loss_ratio = 0.03
max_daily_trades = 4
"#,
        )
        .unwrap();

        assert_eq!(strategy_mode(&config), StrategyMode::EtfIntraday);
        assert!((build_backtest_config(&config).initial_capital - 250_000.0).abs() < 1e-9);
        let sizing = build_sizer_config(&config);
        assert_eq!(sizing.method, SizingMethod::Fixed);
        assert_eq!(sizing.lot_size, 200);
        assert!((build_stop_policy(&config).stop_ratio - 0.03).abs() < 1e-12);
        assert_eq!(build_risk_limits(&config).max_daily_trades, 4);
    }

    #[test]
    fn boll_multiplier_encodes_to_x100() {
        let config =
            FileConfigAdapter::from_string("[strategy]\nboll_stddev_mult = 2.5\n").unwrap();
        let combiner = build_combiner(&config);
        // Smoke check through the combiner: construction must not panic and
        // the analyzer must produce a signal.
        let signal = combiner.combine("600000", &[]);
        assert_eq!(signal.instrument, "600000");
    }

    #[test]
    fn missing_bars_dir_is_a_config_error() {
        let config = FileConfigAdapter::from_string("[backtest]\ninitial_capital = 1\n").unwrap();
        let err = require_string(&config, "data", "bars_dir").unwrap_err();
        assert!(matches!(
            err,
            QuantraderError::ConfigMissing { ref section, ref key }
                if section == "data" && key == "bars_dir"
        ));
    }

    #[test]
    fn cli_parses_backtest_command() {
        let cli = Cli::try_parse_from([
            "quantrader",
            "backtest",
            "--config",
            "my.ini",
            "--instrument",
            "600000",
        ])
        .unwrap();
        match cli.command {
            Commands::Backtest { config, instrument } => {
                assert_eq!(config, PathBuf::from("my.ini"));
                assert_eq!(instrument, "600000");
            }
            _ => panic!("expected backtest subcommand"),
        }
    }

    #[test]
    fn cli_config_defaults_to_config_ini() {
        let cli = Cli::try_parse_from(["quantrader", "validate"]).unwrap();
        match cli.command {
            Commands::Validate { config } => assert_eq!(config, PathBuf::from("config.ini")),
            _ => panic!("expected validate subcommand"),
        }
    }
}
