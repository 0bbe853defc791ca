//! RSI (Relative Strength Index) indicator.
//!
//! Average gain/loss are plain rolling means over the last n price changes
//! (not Wilder smoothing), matching the reference series bar-for-bar.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss); 100 when avg_loss == 0.
//! Warmup: first n bars are invalid (n changes are needed for the window).

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        let values: Vec<IndicatorPoint> = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();

        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        // Changes indexed one behind the bars: bar i closes change i-1.
        let window = &gains[i - period..i];
        let avg_gain = window.iter().sum::<f64>() / period as f64;
        let window = &losses[i - period..i];
        let avg_loss = window.iter().sum::<f64>() / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(rsi),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
