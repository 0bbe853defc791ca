//! Technical indicator implementations.
//!
//! Every indicator is a pure function over a bar slice returning an
//! [`IndicatorSeries`] aligned with the input: one [`IndicatorPoint`] per
//! bar, with warmup bars marked `valid: false` instead of raising.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod stochastic;
pub mod atr;
pub mod volume_ma;
pub mod momentum;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default};
pub use momentum::{calculate_momentum, calculate_pct_change};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, calculate_williams_r};
pub use volume_ma::calculate_volume_sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    /// The scalar payload of a `Simple` value, 0.0 for composite shapes.
    pub fn simple(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    VolumeSma(usize),
    Momentum(usize),
    PctChange(usize),
    WilliamsR(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Point at `index`, if present and valid.
    pub fn valid_at(&self, index: usize) -> Option<&IndicatorValue> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| &p.value)
    }

    /// Last valid point in the series.
    pub fn last_valid(&self) -> Option<&IndicatorValue> {
        self.values.iter().rev().find(|p| p.valid).map(|p| &p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLSMA({})", period),
            IndicatorType::Momentum(period) => write!(f, "MOM({})", period),
            IndicatorType::PctChange(period) => write!(f, "PCT({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
