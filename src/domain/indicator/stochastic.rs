//! Stochastic oscillator (%K/%D) and Williams %R.
//!
//! %K = 100 × (close - lowest_low(n)) / (highest_high(n) - lowest_low(n))
//! %D = SMA(m) of %K
//! Williams %R = -100 × (highest_high(n) - close) / (highest_high(n) - lowest_low(n))
//!
//! A flat window (highest == lowest) yields %K = 50 and %R = -50.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> IndicatorSeries {
    if k_period == 0 || d_period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Stochastic { k_period, d_period },
            values: Vec::new(),
        };
    }

    let mut k_values: Vec<f64> = vec![0.0; bars.len()];
    let k_warmup = k_period - 1;

    for i in k_warmup..bars.len() {
        let window = &bars[i + 1 - k_period..=i];
        let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let range = highest - lowest;

        k_values[i] = if range > 0.0 {
            100.0 * (bars[i].close - lowest) / range
        } else {
            50.0
        };
    }

    let warmup = k_warmup + d_period - 1;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= warmup;
        let (k, d) = if valid {
            let d_window = &k_values[i + 1 - d_period..=i];
            let d = d_window.iter().sum::<f64>() / d_period as f64;
            (k_values[i], d)
        } else {
            (0.0, 0.0)
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Stochastic { k, d },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic { k_period, d_period },
        values,
    }
}

pub fn calculate_williams_r(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::WilliamsR(period),
            values: Vec::new(),
        };
    }

    let warmup = period - 1;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= warmup;
        let r = if valid {
            let window = &bars[i + 1 - period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;

            if range > 0.0 {
                -100.0 * (highest - bar.close) / range
            } else {
                -50.0
            }
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(r),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::WilliamsR(period),
        values,
    }
}
