//! Momentum analyzer: raw window momentum plus last-day percent change.
//!
//! The trend gate is the raw price difference over the window (momentum
//! as `close[t] - close[t-n]`, in price units), the confirmation gate is
//! the last bar's percent change. A strong call needs both.

use crate::domain::analyzer::technical::MIN_HISTORY;
use crate::domain::bar::PriceBar;
use crate::domain::indicator::{calculate_momentum, calculate_pct_change};
use crate::domain::signal::{Signal, SignalKind, SignalSource};

const STRONG_MOMENTUM: f64 = 5.0;
const STRONG_DAILY_PCT: f64 = 2.0;
const MILD_MOMENTUM: f64 = 2.0;
const MILD_DAILY_PCT: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct MomentumAnalyzer {
    window: usize,
}

impl Default for MomentumAnalyzer {
    fn default() -> Self {
        MomentumAnalyzer { window: 10 }
    }
}

impl MomentumAnalyzer {
    pub fn new(window: usize) -> Self {
        MomentumAnalyzer { window }
    }

    pub fn analyze(&self, instrument: &str, bars: &[PriceBar]) -> Signal {
        let last = match bars.last() {
            Some(bar) => bar,
            None => {
                return Signal::hold(
                    instrument,
                    chrono::NaiveDate::MIN,
                    0.0,
                    SignalSource::Momentum,
                    "no bars",
                )
            }
        };

        if bars.len() < MIN_HISTORY || bars.len() <= self.window {
            return Signal::hold(
                instrument,
                last.date,
                last.close,
                SignalSource::Momentum,
                "insufficient history",
            );
        }

        let i = bars.len() - 1;
        let momentum_series = calculate_momentum(bars, self.window);
        let daily_series = calculate_pct_change(bars, 1);

        let (momentum, daily_pct) = match (momentum_series.valid_at(i), daily_series.valid_at(i)) {
            (Some(m), Some(d)) => (m.simple(), d.simple()),
            _ => {
                return Signal::hold(
                    instrument,
                    last.date,
                    last.close,
                    SignalSource::Momentum,
                    "momentum warming up",
                )
            }
        };

        let (kind, strength, rationale) = if momentum > STRONG_MOMENTUM
            && daily_pct > STRONG_DAILY_PCT
        {
            (SignalKind::StrongBuy, 0.8, "strong upward momentum")
        } else if momentum > MILD_MOMENTUM && daily_pct > MILD_DAILY_PCT {
            (SignalKind::Buy, 0.6, "upward momentum")
        } else if momentum < -STRONG_MOMENTUM && daily_pct < -STRONG_DAILY_PCT {
            (SignalKind::StrongSell, 0.8, "strong downward momentum")
        } else if momentum < -MILD_MOMENTUM && daily_pct < -MILD_DAILY_PCT {
            (SignalKind::Sell, 0.6, "downward momentum")
        } else {
            (SignalKind::Hold, 0.0, "no clear momentum")
        };

        Signal {
            instrument: instrument.to_string(),
            kind,
            strength,
            rationale: rationale.to_string(),
            reference_price: last.close,
            date: last.date,
            source: SignalSource::Momentum,
        }
    }
}
