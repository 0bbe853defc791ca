//! Live decision cycle.
//!
//! One pass for one instrument: load history and a realtime quote, gate
//! on risk, check stops on any open position, then generate and act on a
//! signal. Orders go through the broker port; every signal, order and
//! risk verdict is recorded through the audit port. Audit failures are
//! reported and swallowed so a full disk never blocks an exit.

use crate::domain::analyzer::{
    BandAnalyzer, SignalCombiner, SignalGenerator, StrategyMode, MIN_HISTORY,
};
use crate::domain::error::QuantraderError;
use crate::domain::position::{Position, Trade, TradeReason, TradeSide};
use crate::domain::risk::{RiskCheckResult, RiskController, RiskInputs};
use crate::domain::signal::Signal;
use crate::domain::sizing::PositionSizer;
use crate::domain::stops::{EntrySide, ExitCheck, StopPolicy};
use crate::ports::audit_port::AuditPort;
use crate::ports::broker_port::{BrokerPort, OrderId, OrderRequest};
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;

/// Daily bars loaded per cycle; enough for the slowest indicator warmup
/// with margin.
const HISTORY_BARS: usize = 120;

/// Account snapshot the caller maintains between cycles.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub cash: f64,
    pub total_asset: f64,
    pub position: Option<Position>,
    pub daily_realized_pnl: f64,
    pub todays_trades: usize,
    pub pnl_history: Vec<(NaiveDate, f64)>,
}

impl AccountState {
    pub fn flat(cash: f64) -> Self {
        AccountState {
            cash,
            total_asset: cash,
            position: None,
            daily_realized_pnl: 0.0,
            todays_trades: 0,
            pnl_history: Vec::new(),
        }
    }
}

/// What a cycle did.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The risk gate forbade trading; no signal was evaluated.
    RiskBlocked(RiskCheckResult),
    /// A stop or take-profit fired and the position was liquidated.
    StopExit { order_id: OrderId, trade: Trade },
    /// The signal led to an order.
    Traded {
        signal: Signal,
        order_id: OrderId,
        trade: Trade,
    },
    /// The signal did not lead to an order.
    NoAction { signal: Signal },
}

pub struct LiveEngine {
    mode: StrategyMode,
    combiner: SignalCombiner,
    band: BandAnalyzer,
    sizer: PositionSizer,
    stops: StopPolicy,
    risk: RiskController,
    commission_rate: f64,
}

impl LiveEngine {
    pub fn new(
        mode: StrategyMode,
        combiner: SignalCombiner,
        band: BandAnalyzer,
        sizer: PositionSizer,
        stops: StopPolicy,
        risk: RiskController,
        commission_rate: f64,
    ) -> Self {
        LiveEngine {
            mode,
            combiner,
            band,
            sizer,
            stops,
            risk,
            commission_rate,
        }
    }

    pub fn run_cycle(
        &self,
        instrument: &str,
        account: &AccountState,
        data: &dyn MarketDataPort,
        broker: &mut dyn BrokerPort,
        audit: &mut dyn AuditPort,
    ) -> Result<CycleOutcome, QuantraderError> {
        let bars = data.get_bars(instrument, HISTORY_BARS)?;
        if bars.len() < MIN_HISTORY {
            return Err(QuantraderError::InsufficientData {
                instrument: instrument.to_string(),
                bars: bars.len(),
                minimum: MIN_HISTORY,
            });
        }
        let quote = data.get_realtime(instrument)?;

        let risk_check = self.risk.comprehensive(&RiskInputs {
            daily_realized_pnl: account.daily_realized_pnl,
            total_asset: account.total_asset,
            position_value: account
                .position
                .as_ref()
                .map(|p| quote.price * p.volume as f64)
                .unwrap_or(0.0),
            todays_trades: account.todays_trades,
            pnl_history: &account.pnl_history,
            as_of: quote.date,
        });
        record_risk(audit, &risk_check);

        if !risk_check.action.permits_trading() {
            return Ok(CycleOutcome::RiskBlocked(risk_check));
        }

        if let Some(pos) = account.position.as_ref() {
            let exit = self.stops.check(quote.price, pos.avg_cost, EntrySide::Long);
            if exit != ExitCheck::Hold {
                let reason = match exit {
                    ExitCheck::StopLoss => TradeReason::StopLoss,
                    ExitCheck::TakeProfit => TradeReason::TakeProfit,
                    ExitCheck::Hold => unreachable!(),
                };
                let order = OrderRequest {
                    instrument: instrument.to_string(),
                    side: TradeSide::Sell,
                    price: quote.price,
                    volume: pos.volume,
                };
                let order_id = broker.submit_order(&order)?;
                let trade = self.trade_from(&order, quote.date, reason);
                record_trade(audit, &trade);
                return Ok(CycleOutcome::StopExit { order_id, trade });
            }
        }

        let (signal, suggested_volume) = match self.mode {
            StrategyMode::Combined => {
                let signal = self.combiner.generate(instrument, &bars);
                (signal, 0)
            }
            StrategyMode::EtfIntraday => {
                let advice = self.band.analyze(instrument, &bars, quote.price, quote.date);
                (advice.signal, advice.suggested_volume)
            }
        };
        record_signal(audit, &signal);

        if account.position.is_none() && signal.kind.is_buy() {
            let volume = match self.mode {
                StrategyMode::Combined => self.sizer.size(
                    signal.strength,
                    quote.price,
                    account.cash,
                    account.total_asset,
                ),
                StrategyMode::EtfIntraday => suggested_volume,
            };
            let lot = self.sizer.config().lot_size;
            if volume >= lot {
                let amount = quote.price * volume as f64;
                if amount + amount * self.commission_rate <= account.cash {
                    let order = OrderRequest {
                        instrument: instrument.to_string(),
                        side: TradeSide::Buy,
                        price: quote.price,
                        volume,
                    };
                    let order_id = broker.submit_order(&order)?;
                    let trade = self.trade_from(
                        &order,
                        quote.date,
                        TradeReason::Signal {
                            rationale: signal.rationale.clone(),
                        },
                    );
                    record_trade(audit, &trade);
                    return Ok(CycleOutcome::Traded {
                        signal,
                        order_id,
                        trade,
                    });
                }
            }
        } else if let Some(pos) = account.position.as_ref() {
            if signal.kind.is_sell() {
                let lot = self.sizer.config().lot_size;
                let volume = match self.mode {
                    StrategyMode::Combined => {
                        let ratio = if signal.strength >= 0.8 {
                            1.0
                        } else if signal.strength >= 0.5 {
                            0.5
                        } else {
                            0.33
                        };
                        ((pos.volume as f64 * ratio) as i64 / lot) * lot
                    }
                    StrategyMode::EtfIntraday => {
                        (suggested_volume.min(pos.volume) / lot) * lot
                    }
                };
                if volume >= lot {
                    let order = OrderRequest {
                        instrument: instrument.to_string(),
                        side: TradeSide::Sell,
                        price: quote.price,
                        volume,
                    };
                    let order_id = broker.submit_order(&order)?;
                    let trade = self.trade_from(
                        &order,
                        quote.date,
                        TradeReason::Signal {
                            rationale: signal.rationale.clone(),
                        },
                    );
                    record_trade(audit, &trade);
                    return Ok(CycleOutcome::Traded {
                        signal,
                        order_id,
                        trade,
                    });
                }
            }
        }

        Ok(CycleOutcome::NoAction { signal })
    }

    fn trade_from(&self, order: &OrderRequest, date: NaiveDate, reason: TradeReason) -> Trade {
        let amount = order.price * order.volume as f64;
        Trade {
            date,
            instrument: order.instrument.clone(),
            side: order.side,
            price: order.price,
            volume: order.volume,
            amount,
            commission: amount * self.commission_rate,
            reason,
        }
    }
}

fn record_signal(audit: &mut dyn AuditPort, signal: &Signal) {
    if let Err(e) = audit.record_signal(signal) {
        eprintln!("warning: audit signal record failed: {}", e);
    }
}

fn record_trade(audit: &mut dyn AuditPort, trade: &Trade) {
    if let Err(e) = audit.record_trade(trade) {
        eprintln!("warning: audit trade record failed: {}", e);
    }
}

fn record_risk(audit: &mut dyn AuditPort, check: &RiskCheckResult) {
    if let Err(e) = audit.record_risk_check(check) {
        eprintln!("warning: audit risk record failed: {}", e);
    }
}
