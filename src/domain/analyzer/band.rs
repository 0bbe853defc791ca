//! Band analyzer for ETF grid trading.
//!
//! Compares a realtime price against the Bollinger middle band built from
//! daily history: above the middle sells, below it buys. A trailing run of
//! same-signed MACD histogram bars confirms the call and scales the
//! suggested lot count.

use chrono::{Datelike, NaiveDate};

use crate::domain::analyzer::technical::MIN_HISTORY;
use crate::domain::bar::PriceBar;
use crate::domain::indicator::{calculate_bollinger, calculate_macd_default, IndicatorValue};
use crate::domain::signal::{Signal, SignalKind, SignalSource};

const BAND_PERIOD: usize = 20;
const BAND_STDDEV_MULT_X100: u32 = 200;
const HISTOGRAM_LOOKBACK: usize = 5;
const MIN_RUN: usize = 2;
const LOT: i64 = 100;

/// A band decision plus the lot-sized volume it suggests.
#[derive(Debug, Clone)]
pub struct BandAdvice {
    pub signal: Signal,
    pub suggested_volume: i64,
    /// Mean daily high-low range over the current calendar year, a rough
    /// baseline for how wide the instrument usually swings.
    pub volatility_baseline: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BandAnalyzer;

impl BandAnalyzer {
    pub fn new() -> Self {
        BandAnalyzer
    }

    pub fn analyze(
        &self,
        instrument: &str,
        bars: &[PriceBar],
        realtime_price: f64,
        date: NaiveDate,
    ) -> BandAdvice {
        if bars.len() < MIN_HISTORY {
            return BandAdvice {
                signal: Signal::hold(
                    instrument,
                    date,
                    realtime_price,
                    SignalSource::MeanReversion,
                    "insufficient history",
                ),
                suggested_volume: 0,
                volatility_baseline: 0.0,
            };
        }

        let volatility_baseline = yearly_range_baseline(bars, date.year());

        let boll = calculate_bollinger(bars, BAND_PERIOD, BAND_STDDEV_MULT_X100);
        let middle = match boll.last_valid() {
            Some(IndicatorValue::Bollinger { middle, .. }) => *middle,
            _ => {
                return BandAdvice {
                    signal: Signal::hold(
                        instrument,
                        date,
                        realtime_price,
                        SignalSource::MeanReversion,
                        "bollinger warming up",
                    ),
                    suggested_volume: 0,
                    volatility_baseline,
                };
            }
        };

        let (run_kind, run_len) = histogram_run(bars);

        let (kind, strength, suggested_volume, rationale) = if realtime_price > middle {
            if run_kind == SignalKind::Sell && run_len >= MIN_RUN {
                (
                    SignalKind::Sell,
                    0.8,
                    run_len as i64 * LOT,
                    "above middle band with fading macd".to_string(),
                )
            } else {
                (
                    SignalKind::Sell,
                    0.5,
                    LOT,
                    "above middle band".to_string(),
                )
            }
        } else if realtime_price < middle {
            if run_kind == SignalKind::Buy && run_len >= MIN_RUN {
                (
                    SignalKind::Buy,
                    0.8,
                    run_len as i64 * LOT,
                    "below middle band with exhausted macd".to_string(),
                )
            } else {
                (SignalKind::Buy, 0.5, LOT, "below middle band".to_string())
            }
        } else {
            (
                SignalKind::Hold,
                0.0,
                0,
                "price at middle band".to_string(),
            )
        };

        BandAdvice {
            signal: Signal {
                instrument: instrument.to_string(),
                kind,
                strength,
                rationale,
                reference_price: realtime_price,
                date,
                source: SignalSource::MeanReversion,
            },
            suggested_volume,
            volatility_baseline,
        }
    }
}

/// Length and direction of the trailing same-signed MACD histogram run,
/// looking at the last [`HISTOGRAM_LOOKBACK`] valid bars. A run of negative
/// histograms suggests the downswing is mature (buy side); positive, the
/// upswing (sell side).
fn histogram_run(bars: &[PriceBar]) -> (SignalKind, usize) {
    let macd = calculate_macd_default(bars);
    let histograms: Vec<f64> = macd
        .values
        .iter()
        .filter(|p| p.valid)
        .filter_map(|p| match p.value {
            IndicatorValue::Macd { histogram, .. } => Some(histogram),
            _ => None,
        })
        .collect();

    let tail: Vec<f64> = histograms
        .iter()
        .rev()
        .take(HISTOGRAM_LOOKBACK)
        .copied()
        .collect();

    let Some(&last) = tail.first() else {
        return (SignalKind::Hold, 0);
    };

    if last < 0.0 {
        let run = tail.iter().take_while(|&&h| h < 0.0).count();
        (SignalKind::Buy, run)
    } else if last > 0.0 {
        let run = tail.iter().take_while(|&&h| h > 0.0).count();
        (SignalKind::Sell, run)
    } else {
        (SignalKind::Hold, 0)
    }
}

/// Mean(high) - mean(low) over the bars belonging to `year`. Zero when the
/// year has no bars.
fn yearly_range_baseline(bars: &[PriceBar], year: i32) -> f64 {
    let in_year: Vec<&PriceBar> = bars.iter().filter(|b| b.date.year() == year).collect();
    if in_year.is_empty() {
        return 0.0;
    }

    let n = in_year.len() as f64;
    let mean_high: f64 = in_year.iter().map(|b| b.high).sum::<f64>() / n;
    let mean_low: f64 = in_year.iter().map(|b| b.low).sum::<f64>() / n;
    mean_high - mean_low
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(day_offset: i64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day_offset),
            open: close,
            high: close + 0.05,
            low: close - 0.05,
            close,
            volume: 100_000,
            amount: close * 100_000.0,
        }
    }

    fn flat_bars(count: usize, close: f64) -> Vec<PriceBar> {
        (0..count).map(|i| make_bar(i as i64, close)).collect()
    }

    fn analysis_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn too_few_bars_yields_hold() {
        let analyzer = BandAnalyzer::new();
        let advice = analyzer.analyze("510300", &flat_bars(10, 3.5), 3.6, analysis_date());

        assert_eq!(advice.signal.kind, SignalKind::Hold);
        assert_eq!(advice.suggested_volume, 0);
    }

    #[test]
    fn price_above_middle_sells() {
        let analyzer = BandAnalyzer::new();
        let bars = flat_bars(40, 3.5);
        let advice = analyzer.analyze("510300", &bars, 3.8, analysis_date());

        assert_eq!(advice.signal.kind, SignalKind::Sell);
        assert!(advice.suggested_volume >= 100);
        assert_eq!(advice.suggested_volume % 100, 0);
    }

    #[test]
    fn price_below_middle_buys() {
        let analyzer = BandAnalyzer::new();
        let bars = flat_bars(40, 3.5);
        let advice = analyzer.analyze("510300", &bars, 3.2, analysis_date());

        assert_eq!(advice.signal.kind, SignalKind::Buy);
        assert!(advice.suggested_volume >= 100);
    }

    #[test]
    fn price_at_middle_holds() {
        let analyzer = BandAnalyzer::new();
        let bars = flat_bars(40, 3.5);
        let advice = analyzer.analyze("510300", &bars, 3.5, analysis_date());

        assert_eq!(advice.signal.kind, SignalKind::Hold);
        assert_eq!(advice.suggested_volume, 0);
        assert!((advice.signal.strength - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fading_macd_run_scales_sell_volume() {
        // Rally then rollover: positive histogram run at the tail while the
        // realtime price still sits above the 20-day middle.
        let mut bars = flat_bars(40, 3.0);
        for i in 0..10 {
            bars.push(make_bar(40 + i, 3.0 + 0.05 * (i + 1) as f64));
        }
        let advice = analyzer_advice(&bars, 3.6);

        assert_eq!(advice.signal.kind, SignalKind::Sell);
        if advice.signal.strength > 0.5 {
            assert!(advice.suggested_volume >= 200);
        }
    }

    fn analyzer_advice(bars: &[PriceBar], price: f64) -> BandAdvice {
        BandAnalyzer::new().analyze("510300", bars, price, analysis_date())
    }

    #[test]
    fn volatility_baseline_uses_year_of_analysis_date() {
        let bars = flat_bars(40, 3.5);
        let advice = analyzer_advice(&bars, 3.5);

        // Flat bars with a fixed 0.10 high-low range.
        assert!((advice.volatility_baseline - 0.1).abs() < 1e-9);
    }

    #[test]
    fn volatility_baseline_zero_for_empty_year() {
        let bars = flat_bars(40, 3.5);
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let advice = BandAnalyzer::new().analyze("510300", &bars, 3.5, date);

        assert!((advice.volatility_baseline - 0.0).abs() < f64::EPSILON);
    }
}
