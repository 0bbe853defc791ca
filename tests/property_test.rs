//! Property tests over the sizing, stop and metric invariants.

mod common;

use chrono::NaiveDate;
use proptest::prelude::*;

use common::generate_bars;
use quantrader::domain::indicator::calculate_rsi;
use quantrader::domain::metrics::max_drawdown;
use quantrader::domain::sizing::{PositionSizer, SizerConfig, SizingMethod};
use quantrader::domain::stops::{EntrySide, StopPolicy};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

proptest! {
    #[test]
    fn sized_volume_is_a_non_negative_lot_multiple(
        strength in 0.0f64..=1.0,
        price in 0.5f64..500.0,
        cash in 0.0f64..10_000_000.0,
        method_idx in 0usize..4,
    ) {
        let method = [
            SizingMethod::Fixed,
            SizingMethod::Percentage,
            SizingMethod::Kelly,
            SizingMethod::Atr,
        ][method_idx];
        let sizer = PositionSizer::new(SizerConfig {
            method,
            ..SizerConfig::default()
        });

        let volume = sizer.size(strength, price, cash, cash);
        prop_assert!(volume >= 0);
        prop_assert_eq!(volume % 100, 0);
    }

    #[test]
    fn percentage_sizing_never_exceeds_the_cap(
        strength in 0.0f64..=1.0,
        price in 0.5f64..500.0,
        assets in 10_000.0f64..10_000_000.0,
    ) {
        let sizer = PositionSizer::new(SizerConfig {
            method: SizingMethod::Percentage,
            ..SizerConfig::default()
        });

        let volume = sizer.size(strength, price, assets, assets);
        let committed = volume as f64 * price;
        prop_assert!(committed <= assets * 0.30 + 1e-6);
    }

    #[test]
    fn stop_levels_bracket_a_long_entry(
        entry in 0.5f64..1000.0,
        stop_ratio in 0.001f64..0.5,
        tp_ratio in 0.001f64..0.5,
    ) {
        let policy = StopPolicy::new(stop_ratio, tp_ratio);
        let stop = policy.stop_price(entry, EntrySide::Long);
        let tp = policy.take_profit_price(entry, EntrySide::Long);

        prop_assert!(stop < entry);
        prop_assert!(tp > entry);
    }

    #[test]
    fn max_drawdown_stays_in_unit_interval(
        equity in proptest::collection::vec(1.0f64..10_000_000.0, 0..200),
    ) {
        let dd = max_drawdown(&equity);
        prop_assert!((0.0..=1.0).contains(&dd));
    }

    #[test]
    fn rsi_stays_in_range(
        closes in proptest::collection::vec(1.0f64..1000.0, 2..120),
        period in 2usize..20,
    ) {
        let bars = generate_bars(start_date(), &closes);
        let series = calculate_rsi(&bars, period);

        prop_assert_eq!(series.values.len(), bars.len());
        for point in &series.values {
            if point.valid {
                let rsi = point.value.simple();
                prop_assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
            }
        }
    }
}
