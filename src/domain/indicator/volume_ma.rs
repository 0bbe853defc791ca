//! Volume SMA: simple moving average over share volume.
//!
//! Used by the volume sub-signal to compare current volume against its
//! recent average. Warmup: first (n-1) bars are invalid.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_volume_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::VolumeSma(period),
            values: Vec::new(),
        };
    }

    let warmup = period - 1;
    let mut sum: f64 = 0.0;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.volume as f64;
        if i >= period {
            sum -= bars[i - period].volume as f64;
        }

        let valid = i >= warmup;
        let avg = if valid { sum / period as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(avg),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values,
    }
}
