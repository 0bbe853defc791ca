//! Signal analyzers: multi-indicator technical scoring, momentum
//! confirmation, band trading for ETFs, and the combiner that merges
//! technical and momentum views into one decision.

pub mod technical;
pub mod momentum;
pub mod band;
pub mod combiner;

pub use band::{BandAdvice, BandAnalyzer};
pub use combiner::{SignalCombiner, StrategyMode};
pub use momentum::MomentumAnalyzer;
pub use technical::{TechnicalAnalyzer, TechnicalConfig, MIN_HISTORY};

use crate::domain::bar::PriceBar;
use crate::domain::signal::Signal;

/// Anything that can turn a bar history into a signal for its last bar.
/// The backtest engine and the live cycle are written against this seam.
pub trait SignalGenerator {
    fn generate(&self, instrument: &str, bars: &[PriceBar]) -> Signal;
}

impl SignalGenerator for SignalCombiner {
    fn generate(&self, instrument: &str, bars: &[PriceBar]) -> Signal {
        self.combine(instrument, bars)
    }
}
