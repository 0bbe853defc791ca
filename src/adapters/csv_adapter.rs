//! CSV file market data adapter.
//!
//! One file per instrument, `<instrument>.csv`, with a header row of
//! `date,open,high,low,close,volume,amount` and ISO dates. The amount
//! column is optional; when absent it is derived as close * volume.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::bar::PriceBar;
use crate::domain::error::QuantraderError;
use crate::ports::data_port::{MarketDataPort, RealtimeQuote};

pub struct CsvBarAdapter {
    base_path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }

    fn load_all(&self, instrument: &str) -> Result<Vec<PriceBar>, QuantraderError> {
        let path = self.csv_path(instrument);
        if !path.exists() {
            return Err(QuantraderError::NoData {
                instrument: instrument.to_string(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| QuantraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| QuantraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let field = |idx: usize, name: &str| -> Result<&str, QuantraderError> {
                record.get(idx).ok_or_else(|| QuantraderError::Data {
                    reason: format!("missing {} column", name),
                })
            };
            let number = |idx: usize, name: &str| -> Result<f64, QuantraderError> {
                field(idx, name)?.parse().map_err(|e| QuantraderError::Data {
                    reason: format!("invalid {} value: {}", name, e),
                })
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
                QuantraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;
            let open = number(1, "open")?;
            let high = number(2, "high")?;
            let low = number(3, "low")?;
            let close = number(4, "close")?;
            let volume: i64 =
                field(5, "volume")?
                    .parse()
                    .map_err(|e| QuantraderError::Data {
                        reason: format!("invalid volume value: {}", e),
                    })?;
            let amount = match record.get(6) {
                Some(raw) if !raw.is_empty() => {
                    raw.parse().map_err(|e| QuantraderError::Data {
                        reason: format!("invalid amount value: {}", e),
                    })?
                }
                _ => close * volume as f64,
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
                amount,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl MarketDataPort for CsvBarAdapter {
    fn get_bars(&self, instrument: &str, count: usize) -> Result<Vec<PriceBar>, QuantraderError> {
        let bars = self.load_all(instrument)?;
        let skip = bars.len().saturating_sub(count);
        Ok(bars[skip..].to_vec())
    }

    fn get_realtime(&self, instrument: &str) -> Result<RealtimeQuote, QuantraderError> {
        let bars = self.load_all(instrument)?;
        let last = bars.last().ok_or_else(|| QuantraderError::NoData {
            instrument: instrument.to_string(),
        })?;

        Ok(RealtimeQuote {
            price: last.close,
            volume: last.volume,
            date: last.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, instrument: &str, rows: &[&str]) {
        let path = dir.path().join(format!("{}.csv", instrument));
        let mut file = fs::File::create(path).unwrap();
        writeln!(file, "date,open,high,low,close,volume,amount").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
    }

    #[test]
    fn get_bars_parses_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "600000",
            &[
                "2024-01-03,10.2,10.5,10.1,10.4,12000,124800",
                "2024-01-01,10.0,10.3,9.9,10.2,10000,102000",
                "2024-01-02,10.2,10.4,10.0,10.1,11000,111100",
            ],
        );
        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let bars = adapter.get_bars("600000", 100).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!((bars[0].close - 10.2).abs() < f64::EPSILON);
        assert_eq!(bars[0].volume, 10000);
    }

    #[test]
    fn get_bars_returns_most_recent_count() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "600000",
            &[
                "2024-01-01,10.0,10.0,10.0,10.0,10000,100000",
                "2024-01-02,11.0,11.0,11.0,11.0,10000,110000",
                "2024-01-03,12.0,12.0,12.0,12.0,10000,120000",
            ],
        );
        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let bars = adapter.get_bars("600000", 2).unwrap();

        assert_eq!(bars.len(), 2);
        assert!((bars[0].close - 11.0).abs() < f64::EPSILON);
        assert!((bars[1].close - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_amount_is_derived() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("600000.csv");
        let mut file = fs::File::create(path).unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-01-01,10.0,10.0,10.0,10.0,10000").unwrap();

        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let bars = adapter.get_bars("600000", 10).unwrap();
        assert!((bars[0].amount - 100_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_instrument_is_no_data() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let err = adapter.get_bars("999999", 10).unwrap_err();

        assert!(matches!(err, QuantraderError::NoData { .. }));
    }

    #[test]
    fn malformed_row_is_data_error() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "600000", &["2024-01-01,ten,10.0,10.0,10.0,10000,0"]);
        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let err = adapter.get_bars("600000", 10).unwrap_err();

        assert!(matches!(err, QuantraderError::Data { .. }));
    }

    #[test]
    fn realtime_quote_is_last_bar() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "510300",
            &[
                "2024-01-01,3.50,3.52,3.48,3.51,500000,1755000",
                "2024-01-02,3.51,3.55,3.50,3.54,600000,2124000",
            ],
        );
        let adapter = CsvBarAdapter::new(dir.path().to_path_buf());
        let quote = adapter.get_realtime("510300").unwrap();

        assert!((quote.price - 3.54).abs() < f64::EPSILON);
        assert_eq!(quote.volume, 600000);
        assert_eq!(quote.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
