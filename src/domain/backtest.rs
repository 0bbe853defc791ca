//! Bar-by-bar backtest engine.
//!
//! Long-only single-instrument simulation. Each bar the engine first
//! checks stops on any open position (a triggered stop liquidates in full
//! and skips signal evaluation for that bar), then asks the strategy for
//! a signal over the history up to and including the current bar. Fills
//! happen at the bar close with a proportional commission.

use chrono::NaiveDate;

use crate::domain::analyzer::{SignalGenerator, MIN_HISTORY};
use crate::domain::bar::PriceBar;
use crate::domain::error::QuantraderError;
use crate::domain::metrics::{
    annualized_return, max_drawdown, sharpe_ratio, total_return, trade_statistics, TradeStats,
};
use crate::domain::position::{Position, Trade, TradeReason, TradeSide};
use crate::domain::sizing::PositionSizer;
use crate::domain::stops::{EntrySide, ExitCheck, StopPolicy};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    /// Annual rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 1_000_000.0,
            commission_rate: 0.0003,
            risk_free_rate: 0.03,
        }
    }
}

/// One row of the equity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub cash: f64,
    pub position_value: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub instrument: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub trade_stats: TradeStats,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Bar-over-bar equity returns, one per bar; the first is always zero.
    pub daily_returns: Vec<f64>,
}

pub struct BacktestEngine {
    config: BacktestConfig,
    strategy: Box<dyn SignalGenerator>,
    sizer: PositionSizer,
    stops: StopPolicy,
}

impl BacktestEngine {
    pub fn new(
        config: BacktestConfig,
        strategy: Box<dyn SignalGenerator>,
        sizer: PositionSizer,
        stops: StopPolicy,
    ) -> Self {
        BacktestEngine {
            config,
            strategy,
            sizer,
            stops,
        }
    }

    pub fn run(
        &self,
        instrument: &str,
        bars: &[PriceBar],
    ) -> Result<BacktestResult, QuantraderError> {
        if bars.is_empty() {
            return Err(QuantraderError::NoData {
                instrument: instrument.to_string(),
            });
        }

        let lot = self.sizer.config().lot_size;
        let mut cash = self.config.initial_capital;
        let mut position: Option<Position> = None;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(bars.len());
        let mut daily_returns: Vec<f64> = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            if i + 1 >= MIN_HISTORY {
                let mut stop_fired = false;

                if let Some(pos) = position.as_mut() {
                    let exit = self.stops.check(bar.close, pos.avg_cost, EntrySide::Long);
                    if exit != ExitCheck::Hold {
                        let reason = match exit {
                            ExitCheck::StopLoss => TradeReason::StopLoss,
                            ExitCheck::TakeProfit => TradeReason::TakeProfit,
                            ExitCheck::Hold => unreachable!(),
                        };
                        let volume = pos.volume;
                        let amount = bar.close * volume as f64;
                        let commission = amount * self.config.commission_rate;
                        cash += amount - commission;
                        pos.reduce(volume, bar.close, commission);
                        trades.push(Trade {
                            date: bar.date,
                            instrument: instrument.to_string(),
                            side: TradeSide::Sell,
                            price: bar.close,
                            volume,
                            amount,
                            commission,
                            reason,
                        });
                        position = None;
                        stop_fired = true;
                    }
                }

                if !stop_fired {
                    let signal = self.strategy.generate(instrument, &bars[..=i]);

                    if position.is_none() && signal.kind.is_buy() {
                        let volume =
                            self.sizer.size(signal.strength, bar.close, cash, cash);
                        if volume >= lot {
                            let amount = bar.close * volume as f64;
                            let commission = amount * self.config.commission_rate;
                            if amount + commission <= cash {
                                cash -= amount + commission;
                                position = Some(Position::new(instrument, volume, bar.close));
                                trades.push(Trade {
                                    date: bar.date,
                                    instrument: instrument.to_string(),
                                    side: TradeSide::Buy,
                                    price: bar.close,
                                    volume,
                                    amount,
                                    commission,
                                    reason: TradeReason::Signal {
                                        rationale: signal.rationale.clone(),
                                    },
                                });
                            }
                        }
                    } else if let Some(pos) = position.as_mut() {
                        if signal.kind.is_sell() {
                            let ratio = if signal.strength >= 0.8 {
                                1.0
                            } else if signal.strength >= 0.5 {
                                0.5
                            } else {
                                0.33
                            };
                            let volume =
                                ((pos.volume as f64 * ratio) as i64 / lot) * lot;
                            if volume >= lot {
                                let amount = bar.close * volume as f64;
                                let commission = amount * self.config.commission_rate;
                                cash += amount - commission;
                                pos.reduce(volume, bar.close, commission);
                                trades.push(Trade {
                                    date: bar.date,
                                    instrument: instrument.to_string(),
                                    side: TradeSide::Sell,
                                    price: bar.close,
                                    volume,
                                    amount,
                                    commission,
                                    reason: TradeReason::Signal {
                                        rationale: signal.rationale.clone(),
                                    },
                                });
                                if pos.volume == 0 {
                                    position = None;
                                }
                            }
                        }
                    }
                }
            }

            let position_value = position
                .as_ref()
                .map(|p| bar.close * p.volume as f64)
                .unwrap_or(0.0);
            let equity = cash + position_value;

            let daily_return = match equity_curve.last() {
                Some(prev) if prev.equity > 0.0 => (equity - prev.equity) / prev.equity,
                _ => 0.0,
            };
            daily_returns.push(daily_return);

            equity_curve.push(EquityPoint {
                date: bar.date,
                equity,
                cash,
                position_value,
            });
        }

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.config.initial_capital);
        let start_date = bars[0].date;
        let end_date = bars[bars.len() - 1].date;

        let total_return = total_return(self.config.initial_capital, final_equity);
        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();

        Ok(BacktestResult {
            instrument: instrument.to_string(),
            start_date,
            end_date,
            initial_capital: self.config.initial_capital,
            final_equity,
            total_return,
            annualized_return: annualized_return(total_return, start_date, end_date),
            max_drawdown: max_drawdown(&equity_values),
            sharpe_ratio: sharpe_ratio(&daily_returns[1..], self.config.risk_free_rate),
            trade_stats: trade_statistics(&trades),
            trades,
            equity_curve,
            daily_returns,
        })
    }
}
