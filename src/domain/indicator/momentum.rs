//! Momentum and percentage change over an n-bar lookback.
//!
//! Momentum: close[i] - close[i-n]
//! Percentage change: 100 × (close[i] - close[i-n]) / close[i-n]
//!
//! Both need n prior bars, so the first n points are invalid.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_momentum(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Momentum(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= period;
        let momentum = if valid {
            bar.close - bars[i - period].close
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(momentum),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(period),
        values,
    }
}

pub fn calculate_pct_change(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::PctChange(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= period && bars[i - period].close != 0.0;
        let pct = if valid {
            let base = bars[i - period].close;
            100.0 * (bar.close - base) / base
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(pct),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::PctChange(period),
        values,
    }
}
