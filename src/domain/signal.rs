//! Trading signals emitted by analyzers and the combiner.

use chrono::NaiveDate;
use std::fmt;

/// Directional verdict carried by a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

/// Directional bias of a signal kind, ignoring strength grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl SignalKind {
    pub fn direction(&self) -> Direction {
        match self {
            SignalKind::StrongBuy | SignalKind::Buy => Direction::Bullish,
            SignalKind::Hold => Direction::Neutral,
            SignalKind::Sell | SignalKind::StrongSell => Direction::Bearish,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::StrongBuy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, SignalKind::Sell | SignalKind::StrongSell)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::StrongBuy => "strong_buy",
            SignalKind::Buy => "buy",
            SignalKind::Hold => "hold",
            SignalKind::Sell => "sell",
            SignalKind::StrongSell => "strong_sell",
        };
        write!(f, "{s}")
    }
}

/// Which component produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Technical,
    Momentum,
    MeanReversion,
    Combined,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalSource::Technical => "technical",
            SignalSource::Momentum => "momentum",
            SignalSource::MeanReversion => "mean_reversion",
            SignalSource::Combined => "combined",
        };
        write!(f, "{s}")
    }
}

/// A directional decision with confidence and rationale. Never mutated
/// after creation; `strength` is always in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub instrument: String,
    pub kind: SignalKind,
    pub strength: f64,
    pub rationale: String,
    pub reference_price: f64,
    pub date: NaiveDate,
    pub source: SignalSource,
}

impl Signal {
    pub fn hold(
        instrument: &str,
        date: NaiveDate,
        reference_price: f64,
        source: SignalSource,
        rationale: impl Into<String>,
    ) -> Self {
        Signal {
            instrument: instrument.to_string(),
            kind: SignalKind::Hold,
            strength: 0.0,
            rationale: rationale.into(),
            reference_price,
            date,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_of_buy_kinds() {
        assert_eq!(SignalKind::Buy.direction(), Direction::Bullish);
        assert_eq!(SignalKind::StrongBuy.direction(), Direction::Bullish);
    }

    #[test]
    fn direction_of_sell_kinds() {
        assert_eq!(SignalKind::Sell.direction(), Direction::Bearish);
        assert_eq!(SignalKind::StrongSell.direction(), Direction::Bearish);
    }

    #[test]
    fn hold_is_neutral() {
        assert_eq!(SignalKind::Hold.direction(), Direction::Neutral);
        assert!(!SignalKind::Hold.is_buy());
        assert!(!SignalKind::Hold.is_sell());
    }

    #[test]
    fn kind_display() {
        assert_eq!(SignalKind::StrongBuy.to_string(), "strong_buy");
        assert_eq!(SignalKind::Sell.to_string(), "sell");
    }

    #[test]
    fn hold_constructor() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let s = Signal::hold("510300", date, 3.50, SignalSource::Technical, "too few bars");
        assert_eq!(s.kind, SignalKind::Hold);
        assert!((s.strength - 0.0).abs() < f64::EPSILON);
        assert_eq!(s.rationale, "too few bars");
    }
}
