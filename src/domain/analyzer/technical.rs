//! Multi-indicator technical analyzer.
//!
//! Five sub-signals (moving-average cross, RSI, MACD, Bollinger position,
//! volume confirmation) each vote Buy/Sell/Hold with a strength. The votes
//! are merged by a fixed weighting and a two-threshold grading:
//!
//!   strength = 0.30*ma + 0.20*rsi + 0.25*macd + 0.15*boll + 0.10*volume
//!
//! strength >= 0.6 with a buy/sell majority grades the call Strong; a tie
//! at that level yields Hold. strength >= 0.3 grades a plain Buy/Sell on
//! majority. Anything weaker is Hold.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, calculate_volume_sma,
    IndicatorValue,
};
use crate::domain::signal::{Signal, SignalKind, SignalSource};

/// Bars required before any analyzer will commit to a direction.
pub const MIN_HISTORY: usize = 20;

const WEIGHT_MA: f64 = 0.30;
const WEIGHT_RSI: f64 = 0.20;
const WEIGHT_MACD: f64 = 0.25;
const WEIGHT_BOLL: f64 = 0.15;
const WEIGHT_VOLUME: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct TechnicalConfig {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub boll_period: usize,
    pub boll_stddev_mult_x100: u32,
    pub volume_window: usize,
    /// Daily price change (in percent) treated as significant by the
    /// volume sub-signal.
    pub price_change_threshold: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        TechnicalConfig {
            ma_short: 5,
            ma_long: 20,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            boll_period: 20,
            boll_stddev_mult_x100: 200,
            volume_window: 10,
            price_change_threshold: 2.0,
        }
    }
}

/// One indicator's vote before weighting.
#[derive(Debug, Clone)]
struct SubSignal {
    kind: SignalKind,
    strength: f64,
    rationale: &'static str,
}

impl SubSignal {
    fn hold(rationale: &'static str) -> Self {
        SubSignal {
            kind: SignalKind::Hold,
            strength: 0.0,
            rationale,
        }
    }

    fn buy(strength: f64, rationale: &'static str) -> Self {
        SubSignal {
            kind: SignalKind::Buy,
            strength,
            rationale,
        }
    }

    fn sell(strength: f64, rationale: &'static str) -> Self {
        SubSignal {
            kind: SignalKind::Sell,
            strength,
            rationale,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TechnicalAnalyzer {
    config: TechnicalConfig,
}

impl TechnicalAnalyzer {
    pub fn new(config: TechnicalConfig) -> Self {
        TechnicalAnalyzer { config }
    }

    pub fn config(&self) -> &TechnicalConfig {
        &self.config
    }

    /// Analyze the full bar history for `instrument` and return one signal
    /// for the last bar. Fewer than [`MIN_HISTORY`] bars always yields Hold.
    pub fn analyze(&self, instrument: &str, bars: &[PriceBar]) -> Signal {
        let last = match bars.last() {
            Some(bar) => bar,
            None => {
                return Signal::hold(
                    instrument,
                    chrono::NaiveDate::MIN,
                    0.0,
                    SignalSource::Technical,
                    "no bars",
                )
            }
        };

        if bars.len() < MIN_HISTORY {
            return Signal::hold(
                instrument,
                last.date,
                last.close,
                SignalSource::Technical,
                "insufficient history",
            );
        }

        let ma = self.ma_signal(bars);
        let rsi = self.rsi_signal(bars);
        let macd = self.macd_signal(bars);
        let boll = self.bollinger_signal(bars);
        let volume = self.volume_signal(bars);

        let strength = WEIGHT_MA * ma.strength
            + WEIGHT_RSI * rsi.strength
            + WEIGHT_MACD * macd.strength
            + WEIGHT_BOLL * boll.strength
            + WEIGHT_VOLUME * volume.strength;

        let subs = [&ma, &rsi, &macd, &boll, &volume];
        let buy_votes = subs.iter().filter(|s| s.kind == SignalKind::Buy).count();
        let sell_votes = subs.iter().filter(|s| s.kind == SignalKind::Sell).count();

        let kind = if strength >= 0.6 {
            if buy_votes > sell_votes {
                SignalKind::StrongBuy
            } else if sell_votes > buy_votes {
                SignalKind::StrongSell
            } else {
                SignalKind::Hold
            }
        } else if strength >= 0.3 {
            if buy_votes > sell_votes {
                SignalKind::Buy
            } else if sell_votes > buy_votes {
                SignalKind::Sell
            } else {
                SignalKind::Hold
            }
        } else {
            SignalKind::Hold
        };

        let rationale = format!(
            "ma:{} rsi:{} macd:{} boll:{} vol:{}",
            ma.rationale, rsi.rationale, macd.rationale, boll.rationale, volume.rationale
        );

        Signal {
            instrument: instrument.to_string(),
            kind,
            strength,
            rationale,
            reference_price: last.close,
            date: last.date,
            source: SignalSource::Technical,
        }
    }

    fn ma_signal(&self, bars: &[PriceBar]) -> SubSignal {
        let short = calculate_sma(bars, self.config.ma_short);
        let long = calculate_sma(bars, self.config.ma_long);
        let i = bars.len() - 1;

        let (cur_short, cur_long) = match (short.valid_at(i), long.valid_at(i)) {
            (Some(s), Some(l)) => (s.simple(), l.simple()),
            _ => return SubSignal::hold("ma warming up"),
        };
        let cur_diff = cur_short - cur_long;

        if i > 0 {
            if let (Some(s), Some(l)) = (short.valid_at(i - 1), long.valid_at(i - 1)) {
                let prev_diff = s.simple() - l.simple();
                if prev_diff <= 0.0 && cur_diff > 0.0 {
                    return SubSignal::buy(0.8, "golden cross");
                }
                if prev_diff >= 0.0 && cur_diff < 0.0 {
                    return SubSignal::sell(0.8, "death cross");
                }
            }
        }

        let price = bars[i].close;
        if price > cur_short && price > cur_long && cur_diff > 0.0 {
            return SubSignal::buy(0.5, "price above rising mas");
        }
        if price < cur_short && price < cur_long && cur_diff < 0.0 {
            return SubSignal::sell(0.5, "price below falling mas");
        }

        SubSignal::hold("ma neutral")
    }

    fn rsi_signal(&self, bars: &[PriceBar]) -> SubSignal {
        let rsi = calculate_rsi(bars, self.config.rsi_period);
        let i = bars.len() - 1;

        let cur = match rsi.valid_at(i) {
            Some(v) => v.simple(),
            None => return SubSignal::hold("rsi warming up"),
        };

        if cur <= self.config.rsi_oversold {
            return SubSignal::buy(0.7, "rsi oversold");
        }
        if cur >= self.config.rsi_overbought {
            return SubSignal::sell(0.7, "rsi overbought");
        }

        if i > 0 {
            if let Some(prev) = rsi.valid_at(i - 1) {
                let prev = prev.simple();
                if prev <= self.config.rsi_oversold && cur > self.config.rsi_oversold {
                    return SubSignal::buy(0.5, "rsi leaving oversold");
                }
                if prev >= self.config.rsi_overbought && cur < self.config.rsi_overbought {
                    return SubSignal::sell(0.5, "rsi leaving overbought");
                }
            }
        }

        SubSignal::hold("rsi neutral")
    }

    fn macd_signal(&self, bars: &[PriceBar]) -> SubSignal {
        let macd = calculate_macd(
            bars,
            self.config.macd_fast,
            self.config.macd_slow,
            self.config.macd_signal,
        );
        let i = bars.len() - 1;

        let (cur_line, cur_signal, cur_hist) = match macd.valid_at(i) {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) => (*line, *signal, *histogram),
            _ => return SubSignal::hold("macd warming up"),
        };

        let (prev_line, prev_signal, prev_hist) = match i
            .checked_sub(1)
            .and_then(|p| macd.valid_at(p))
        {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) => (*line, *signal, *histogram),
            _ => return SubSignal::hold("macd warming up"),
        };

        let cur_diff = cur_line - cur_signal;
        let prev_diff = prev_line - prev_signal;

        if prev_diff <= 0.0 && cur_diff > 0.0 {
            return SubSignal::buy(0.6, "macd cross up");
        }
        if prev_diff >= 0.0 && cur_diff < 0.0 {
            return SubSignal::sell(0.6, "macd cross down");
        }

        if cur_hist > prev_hist && cur_hist > 0.0 {
            return SubSignal::buy(0.3, "macd momentum rising");
        }
        if cur_hist < prev_hist && cur_hist < 0.0 {
            return SubSignal::sell(0.3, "macd momentum falling");
        }

        SubSignal::hold("macd neutral")
    }

    fn bollinger_signal(&self, bars: &[PriceBar]) -> SubSignal {
        let boll = calculate_bollinger(
            bars,
            self.config.boll_period,
            self.config.boll_stddev_mult_x100,
        );
        let i = bars.len() - 1;

        let (upper, middle, lower) = match boll.valid_at(i) {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (*upper, *middle, *lower),
            _ => return SubSignal::hold("bollinger warming up"),
        };

        let price = bars[i].close;
        if price <= lower {
            return SubSignal::buy(0.6, "price at lower band");
        }
        if price >= upper {
            return SubSignal::sell(0.6, "price at upper band");
        }
        if price > middle {
            return SubSignal::buy(0.2, "price in upper half");
        }
        if price < middle {
            return SubSignal::sell(0.2, "price in lower half");
        }

        SubSignal::hold("price at middle band")
    }

    fn volume_signal(&self, bars: &[PriceBar]) -> SubSignal {
        let vol_sma = calculate_volume_sma(bars, self.config.volume_window);
        let i = bars.len() - 1;

        let avg = match vol_sma.valid_at(i) {
            Some(v) => v.simple(),
            None => return SubSignal::hold("insufficient volume data"),
        };

        let vol = bars[i].volume as f64;
        let prev_close = bars[i - 1].close;
        let change = if prev_close != 0.0 {
            100.0 * (bars[i].close - prev_close) / prev_close
        } else {
            0.0
        };
        let threshold = self.config.price_change_threshold;

        if vol > 1.5 * avg {
            if change > threshold {
                return SubSignal::buy(0.4, "volume surge on gain");
            }
            if change < -threshold {
                return SubSignal::sell(0.4, "volume surge on loss");
            }
        } else if vol < 0.5 * avg {
            if change.abs() < 0.5 * threshold {
                return SubSignal {
                    kind: SignalKind::Hold,
                    strength: 0.1,
                    rationale: "quiet consolidation",
                };
            }
            if change > 0.0 {
                return SubSignal::sell(0.2, "rally on thin volume");
            }
            return SubSignal::buy(0.2, "selloff exhausting");
        }

        SubSignal::hold("volume neutral")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day_offset: i64, close: f64, volume: i64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day_offset),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
            amount: close * volume as f64,
        }
    }

    fn flat_bars(count: usize, close: f64) -> Vec<PriceBar> {
        (0..count)
            .map(|i| make_bar(i as i64, close, 10_000))
            .collect()
    }

    #[test]
    fn too_few_bars_yields_hold() {
        let analyzer = TechnicalAnalyzer::default();
        let bars = flat_bars(19, 100.0);
        let signal = analyzer.analyze("600000", &bars);

        assert_eq!(signal.kind, SignalKind::Hold);
        assert!((signal.strength - 0.0).abs() < f64::EPSILON);
        assert_eq!(signal.rationale, "insufficient history");
    }

    #[test]
    fn empty_bars_yields_hold() {
        let analyzer = TechnicalAnalyzer::default();
        let signal = analyzer.analyze("600000", &[]);
        assert_eq!(signal.kind, SignalKind::Hold);
    }

    #[test]
    fn flat_market_is_hold() {
        let analyzer = TechnicalAnalyzer::default();
        let bars = flat_bars(60, 100.0);
        let signal = analyzer.analyze("600000", &bars);

        assert_eq!(signal.kind, SignalKind::Hold);
    }

    #[test]
    fn signal_carries_last_bar_date_and_price() {
        let analyzer = TechnicalAnalyzer::default();
        let bars = flat_bars(30, 50.0);
        let signal = analyzer.analyze("510300", &bars);

        assert_eq!(signal.date, bars.last().unwrap().date);
        assert!((signal.reference_price - 50.0).abs() < f64::EPSILON);
        assert_eq!(signal.source, SignalSource::Technical);
    }

    #[test]
    fn strength_stays_in_unit_interval() {
        let analyzer = TechnicalAnalyzer::default();
        // Strong sustained uptrend with rising volume.
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| make_bar(i, 100.0 * (1.0 + 0.01 * i as f64), 10_000 + 200 * i))
            .collect();
        let signal = analyzer.analyze("600000", &bars);

        assert!((0.0..=1.0).contains(&signal.strength));
    }

    #[test]
    fn golden_cross_votes_buy() {
        let analyzer = TechnicalAnalyzer::default();
        // Long decline followed by a sharp reversal pushes the short MA
        // back above the long MA.
        let mut prices: Vec<f64> = (0..40).map(|i| 120.0 - 0.5 * i as f64).collect();
        prices.extend((0..6).map(|i| 100.0 + 3.0 * i as f64));
        let bars: Vec<PriceBar> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| make_bar(i as i64, p, 10_000))
            .collect();

        let signal = analyzer.analyze("600000", &bars);
        assert!(
            signal.rationale.contains("golden cross")
                || signal.rationale.contains("price above rising mas"),
            "unexpected rationale: {}",
            signal.rationale
        );
    }

    #[test]
    fn downtrend_leans_bearish() {
        let analyzer = TechnicalAnalyzer::default();
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| make_bar(i, 150.0 - 1.0 * i as f64, 10_000))
            .collect();
        let signal = analyzer.analyze("600000", &bars);

        assert!(
            signal.kind == SignalKind::Sell
                || signal.kind == SignalKind::StrongSell
                || signal.kind == SignalKind::Hold
        );
        assert!(!signal.kind.is_buy());
    }
}
