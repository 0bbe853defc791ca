//! Holdings and executed trades.

use chrono::NaiveDate;
use std::fmt;

/// An open holding in one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument: String,
    pub volume: i64,
    pub avg_cost: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    /// P&L locked in by exits from this holding, net of sell commissions.
    pub realized_pnl: f64,
}

impl Position {
    pub fn new(instrument: &str, volume: i64, avg_cost: f64) -> Self {
        Position {
            instrument: instrument.to_string(),
            volume,
            avg_cost,
            market_value: avg_cost * volume as f64,
            unrealized_pnl: 0.0,
            realized_pnl: 0.0,
        }
    }

    /// Refresh market value and unrealized P&L at `price`.
    pub fn mark(&mut self, price: f64) {
        self.market_value = price * self.volume as f64;
        self.unrealized_pnl = (price - self.avg_cost) * self.volume as f64;
    }

    /// Sell `volume` shares at `price`, decrementing the holding and
    /// accruing realized P&L. Returns the realized amount for this exit.
    pub fn reduce(&mut self, volume: i64, price: f64, commission: f64) -> f64 {
        let realized = (price - self.avg_cost) * volume as f64 - commission;
        self.volume -= volume;
        self.realized_pnl += realized;
        realized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Why a trade happened. Stop exits are recorded distinctly from
/// signal-driven trades so results can separate them.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeReason {
    Signal { rationale: String },
    StopLoss,
    TakeProfit,
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeReason::Signal { .. } => write!(f, "signal"),
            TradeReason::StopLoss => write!(f, "stop_loss"),
            TradeReason::TakeProfit => write!(f, "take_profit"),
        }
    }
}

/// A filled order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub instrument: String,
    pub side: TradeSide,
    pub price: f64,
    pub volume: i64,
    pub amount: f64,
    pub commission: f64,
    pub reason: TradeReason,
}
