//! Market data access port trait.

use chrono::NaiveDate;

use crate::domain::bar::PriceBar;
use crate::domain::error::QuantraderError;

/// A realtime snapshot for an instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeQuote {
    pub price: f64,
    pub volume: i64,
    pub date: NaiveDate,
}

pub trait MarketDataPort {
    /// The most recent `count` daily bars, oldest first. Fewer bars than
    /// requested is not an error; an unknown instrument is.
    fn get_bars(&self, instrument: &str, count: usize) -> Result<Vec<PriceBar>, QuantraderError>;

    /// Latest available price snapshot for the instrument.
    fn get_realtime(&self, instrument: &str) -> Result<RealtimeQuote, QuantraderError>;
}
