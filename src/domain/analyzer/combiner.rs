//! Merges the technical and momentum views into one tradeable signal.
//!
//! combined = 0.7 * technical.strength + 0.3 * momentum.strength
//!
//! When both analyzers lean the same (non-neutral) way, a combined
//! strength of 0.7 or more upgrades the call to its Strong variant;
//! otherwise the technical kind stands. When they disagree, the technical
//! view is kept only if the combined strength still reaches 0.5.

use std::fmt;

use crate::domain::analyzer::momentum::MomentumAnalyzer;
use crate::domain::analyzer::technical::TechnicalAnalyzer;
use crate::domain::bar::PriceBar;
use crate::domain::signal::{Direction, Signal, SignalKind, SignalSource};

const TECHNICAL_WEIGHT: f64 = 0.7;
const MOMENTUM_WEIGHT: f64 = 0.3;
const STRONG_THRESHOLD: f64 = 0.7;
const DISAGREE_THRESHOLD: f64 = 0.5;

/// How signals are produced for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Daily bars through the technical + momentum combiner.
    Combined,
    /// Realtime price against daily Bollinger bands, for ETF grids.
    EtfIntraday,
}

impl StrategyMode {
    pub fn parse(s: &str) -> Option<StrategyMode> {
        match s {
            "combined" => Some(StrategyMode::Combined),
            "etf" => Some(StrategyMode::EtfIntraday),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyMode::Combined => write!(f, "combined"),
            StrategyMode::EtfIntraday => write!(f, "etf"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalCombiner {
    technical: TechnicalAnalyzer,
    momentum: MomentumAnalyzer,
}

impl SignalCombiner {
    pub fn new(technical: TechnicalAnalyzer, momentum: MomentumAnalyzer) -> Self {
        SignalCombiner {
            technical,
            momentum,
        }
    }

    pub fn combine(&self, instrument: &str, bars: &[PriceBar]) -> Signal {
        let tech = self.technical.analyze(instrument, bars);
        let mom = self.momentum.analyze(instrument, bars);

        let combined = TECHNICAL_WEIGHT * tech.strength + MOMENTUM_WEIGHT * mom.strength;
        let tech_dir = tech.kind.direction();

        let kind = if tech_dir == mom.kind.direction() && tech_dir != Direction::Neutral {
            if combined >= STRONG_THRESHOLD {
                match tech_dir {
                    Direction::Bullish => SignalKind::StrongBuy,
                    Direction::Bearish => SignalKind::StrongSell,
                    Direction::Neutral => unreachable!(),
                }
            } else {
                tech.kind
            }
        } else if combined >= DISAGREE_THRESHOLD {
            tech.kind
        } else {
            SignalKind::Hold
        };

        let rationale = format!("technical[{}] momentum[{}]", tech.rationale, mom.rationale);

        Signal {
            instrument: instrument.to_string(),
            kind,
            strength: combined,
            rationale,
            reference_price: tech.reference_price,
            date: tech.date,
            source: SignalSource::Combined,
        }
    }
}
