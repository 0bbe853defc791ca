//! Stop-loss and take-profit levels.
//!
//! Levels are fixed at entry as a ratio of the entry price and never
//! trail. The stop check runs before signal evaluation each bar, and a
//! triggered exit liquidates the whole position.

use crate::domain::position::TradeReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySide {
    Long,
    Short,
}

/// Outcome of a stop check at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCheck {
    StopLoss,
    TakeProfit,
    Hold,
}

impl ExitCheck {
    pub fn reason(&self) -> Option<TradeReason> {
        match self {
            ExitCheck::StopLoss => Some(TradeReason::StopLoss),
            ExitCheck::TakeProfit => Some(TradeReason::TakeProfit),
            ExitCheck::Hold => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StopPolicy {
    pub stop_ratio: f64,
    pub take_profit_ratio: f64,
}

impl Default for StopPolicy {
    fn default() -> Self {
        StopPolicy {
            stop_ratio: 0.05,
            take_profit_ratio: 0.08,
        }
    }
}

impl StopPolicy {
    pub fn new(stop_ratio: f64, take_profit_ratio: f64) -> Self {
        StopPolicy {
            stop_ratio,
            take_profit_ratio,
        }
    }

    pub fn stop_price(&self, entry: f64, side: EntrySide) -> f64 {
        match side {
            EntrySide::Long => entry * (1.0 - self.stop_ratio),
            EntrySide::Short => entry * (1.0 + self.stop_ratio),
        }
    }

    pub fn take_profit_price(&self, entry: f64, side: EntrySide) -> f64 {
        match side {
            EntrySide::Long => entry * (1.0 + self.take_profit_ratio),
            EntrySide::Short => entry * (1.0 - self.take_profit_ratio),
        }
    }

    /// Check `price` against the levels implied by `entry`. Stop-loss wins
    /// when both could fire on the same bar.
    pub fn check(&self, price: f64, entry: f64, side: EntrySide) -> ExitCheck {
        let stop = self.stop_price(entry, side);
        let take_profit = self.take_profit_price(entry, side);

        match side {
            EntrySide::Long => {
                if price <= stop {
                    ExitCheck::StopLoss
                } else if price >= take_profit {
                    ExitCheck::TakeProfit
                } else {
                    ExitCheck::Hold
                }
            }
            EntrySide::Short => {
                if price >= stop {
                    ExitCheck::StopLoss
                } else if price <= take_profit {
                    ExitCheck::TakeProfit
                } else {
                    ExitCheck::Hold
                }
            }
        }
    }
}
