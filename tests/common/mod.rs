//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::Path;

use quantrader::domain::bar::PriceBar;
use quantrader::domain::error::QuantraderError;
use quantrader::ports::data_port::{MarketDataPort, RealtimeQuote};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(d: NaiveDate, close: f64, volume: i64) -> PriceBar {
    PriceBar {
        date: d,
        open: close * 0.998,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume,
        amount: close * volume as f64,
    }
}

/// Deterministic daily bars starting at `start`, one per day.
pub fn generate_bars(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close, 100_000))
        .collect()
}

/// A gentle rise with a periodic wobble, long enough for every indicator.
pub fn trending_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 10.0 + 0.03 * i as f64 + 0.1 * ((i % 7) as f64 - 3.0))
        .collect()
}

/// Write bars as `<instrument>.csv` in the adapter's expected layout.
pub fn write_bars_csv(dir: &Path, instrument: &str, bars: &[PriceBar]) {
    let path = dir.join(format!("{}.csv", instrument));
    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "date,open,high,low,close,volume,amount").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.amount
        )
        .unwrap();
    }
}

/// In-memory data port serving fixed bars and a fixed quote.
pub struct MockMarketDataPort {
    pub bars: Vec<PriceBar>,
    pub quote: RealtimeQuote,
}

impl MarketDataPort for MockMarketDataPort {
    fn get_bars(&self, _instrument: &str, count: usize) -> Result<Vec<PriceBar>, QuantraderError> {
        let skip = self.bars.len().saturating_sub(count);
        Ok(self.bars[skip..].to_vec())
    }

    fn get_realtime(&self, _instrument: &str) -> Result<RealtimeQuote, QuantraderError> {
        Ok(self.quote.clone())
    }
}
