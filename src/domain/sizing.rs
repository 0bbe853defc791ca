//! Position sizing.
//!
//! Four methods share one contract: given a signal strength, a price and
//! the account state, return a volume that is a whole number of lots.
//! Anything below one lot sizes to zero.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMethod {
    /// A fixed cash amount per trade, capped at 95% of available cash.
    Fixed,
    /// A strength-scaled fraction of total assets.
    Percentage,
    /// Fractional Kelly over available cash with a strength-dependent win
    /// probability.
    Kelly,
    /// ATR-style risk budget: a fixed slice of cash against a
    /// price-proportional per-share risk.
    Atr,
}

impl SizingMethod {
    pub fn parse(s: &str) -> Option<SizingMethod> {
        match s {
            "fixed" => Some(SizingMethod::Fixed),
            "percentage" => Some(SizingMethod::Percentage),
            "kelly" => Some(SizingMethod::Kelly),
            "atr" => Some(SizingMethod::Atr),
            _ => None,
        }
    }
}

impl fmt::Display for SizingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingMethod::Fixed => write!(f, "fixed"),
            SizingMethod::Percentage => write!(f, "percentage"),
            SizingMethod::Kelly => write!(f, "kelly"),
            SizingMethod::Atr => write!(f, "atr"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SizerConfig {
    pub method: SizingMethod,
    /// Target cash amount for [`SizingMethod::Fixed`].
    pub trade_amount: f64,
    /// Base asset fraction scaled by strength for [`SizingMethod::Percentage`].
    pub base_ratio: f64,
    /// Hard cap on the asset fraction committed to a single trade.
    pub max_single_position: f64,
    /// Historical average win per winning trade, for the Kelly odds.
    pub avg_win: f64,
    /// Historical average loss per losing trade, for the Kelly odds.
    pub avg_loss: f64,
    /// Per-share risk as a fraction of price (an ATR stand-in), for
    /// [`SizingMethod::Atr`].
    pub atr_ratio: f64,
    /// Cash fraction risked per trade, for [`SizingMethod::Atr`].
    pub risk_budget_ratio: f64,
    pub lot_size: i64,
}

impl Default for SizerConfig {
    fn default() -> Self {
        SizerConfig {
            method: SizingMethod::Percentage,
            trade_amount: 100_000.0,
            base_ratio: 0.30,
            max_single_position: 0.30,
            avg_win: 0.15,
            avg_loss: 0.10,
            atr_ratio: 0.02,
            risk_budget_ratio: 0.01,
            lot_size: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: SizerConfig,
}

impl PositionSizer {
    pub fn new(config: SizerConfig) -> Self {
        PositionSizer { config }
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Volume (in shares, lot-floored) for a buy at `price` with the given
    /// signal strength and account state. Returns 0 when the budget does
    /// not cover one lot, or when `price` is not positive.
    pub fn size(&self, strength: f64, price: f64, cash: f64, total_asset: f64) -> i64 {
        if price <= 0.0 {
            return 0;
        }

        let amount = match self.config.method {
            SizingMethod::Fixed => {
                let mut target = self.config.trade_amount;
                if cash < target {
                    target = cash * 0.95;
                }
                target
            }
            SizingMethod::Percentage => {
                let ratio = (self.config.base_ratio * strength)
                    .min(self.config.max_single_position);
                total_asset * ratio
            }
            SizingMethod::Kelly => {
                let p = 0.55 + 0.15 * strength;
                let odds = if self.config.avg_loss > 0.0 {
                    self.config.avg_win / self.config.avg_loss
                } else {
                    1.0
                };
                let kelly = (odds * p - (1.0 - p)) / odds;
                let ratio = kelly.clamp(0.0, self.config.max_single_position);
                cash * ratio
            }
            SizingMethod::Atr => {
                let risk_per_share = price * self.config.atr_ratio;
                let risk_budget = cash * self.config.risk_budget_ratio;
                if risk_per_share <= 0.0 {
                    return 0;
                }
                // Budget expressed as share count, converted back through price
                // so the lot floor below applies uniformly.
                return self.floor_to_lot(risk_budget / risk_per_share);
            }
        };

        self.floor_to_lot(amount / price)
    }

    fn floor_to_lot(&self, shares: f64) -> i64 {
        let lot = self.config.lot_size;
        if lot <= 0 || !shares.is_finite() || shares < lot as f64 {
            return 0;
        }
        (shares as i64 / lot) * lot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer(method: SizingMethod) -> PositionSizer {
        PositionSizer::new(SizerConfig {
            method,
            ..SizerConfig::default()
        })
    }

    #[test]
    fn sizing_method_parse() {
        assert_eq!(SizingMethod::parse("fixed"), Some(SizingMethod::Fixed));
        assert_eq!(SizingMethod::parse("kelly"), Some(SizingMethod::Kelly));
        assert_eq!(SizingMethod::parse("martingale"), None);
    }

    #[test]
    fn fixed_uses_trade_amount() {
        let sizer = sizer(SizingMethod::Fixed);
        // 100_000 / 10.0 = 10_000 shares, already a lot multiple.
        let volume = sizer.size(0.5, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 10_000);
    }

    #[test]
    fn fixed_caps_at_95_percent_of_cash() {
        let sizer = sizer(SizingMethod::Fixed);
        // cash 50_000 < trade_amount → target 47_500 → 4700 shares at 10.0.
        let volume = sizer.size(0.5, 10.0, 50_000.0, 50_000.0);
        assert_eq!(volume, 4_700);
    }

    #[test]
    fn percentage_scales_with_strength() {
        let sizer = sizer(SizingMethod::Percentage);
        // ratio = 0.30 * 0.5 = 0.15 → 150_000 at price 10 → 15_000 shares.
        let volume = sizer.size(0.5, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 15_000);
    }

    #[test]
    fn percentage_respects_max_single_position() {
        let sizer = PositionSizer::new(SizerConfig {
            method: SizingMethod::Percentage,
            base_ratio: 0.50,
            max_single_position: 0.30,
            ..SizerConfig::default()
        });
        // 0.50 * 1.0 = 0.50 clamps to 0.30 → 300_000 → 30_000 shares.
        let volume = sizer.size(1.0, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 30_000);
    }

    #[test]
    fn kelly_fraction_at_full_strength() {
        let sizer = sizer(SizingMethod::Kelly);
        // p = 0.70, odds = 1.5 → kelly = (1.05 - 0.30) / 1.5 = 0.50,
        // clamped to max_single_position 0.30 → 30_000 shares at 10.0.
        let volume = sizer.size(1.0, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 30_000);
    }

    #[test]
    fn kelly_fraction_at_half_strength_clamps() {
        let sizer = sizer(SizingMethod::Kelly);
        // p = 0.625, odds = 1.5 → kelly = (0.9375 - 0.375) / 1.5 = 0.375,
        // clamped to 0.30 → 30_000 shares at 10.0.
        let volume = sizer.size(0.5, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 30_000);
    }

    #[test]
    fn kelly_budgets_from_cash_not_total_assets() {
        let sizer = sizer(SizingMethod::Kelly);
        // Clamped fraction 0.30 applies to the 200_000 cash, not the
        // 1_000_000 of total assets → 60_000 → 6_000 shares at 10.0.
        let volume = sizer.size(1.0, 10.0, 200_000.0, 1_000_000.0);
        assert_eq!(volume, 6_000);
    }

    #[test]
    fn kelly_never_negative() {
        let sizer = PositionSizer::new(SizerConfig {
            method: SizingMethod::Kelly,
            avg_win: 0.01,
            avg_loss: 0.20,
            ..SizerConfig::default()
        });
        // Terrible odds drive raw Kelly negative; clamp gives 0.
        let volume = sizer.size(0.0, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 0);
    }

    #[test]
    fn atr_risk_budget() {
        let sizer = sizer(SizingMethod::Atr);
        // risk_per_share = 10 * 0.02 = 0.2; budget = 1_000_000 * 0.01 = 10_000
        // → 50_000 shares.
        let volume = sizer.size(0.5, 10.0, 1_000_000.0, 1_000_000.0);
        assert_eq!(volume, 50_000);
    }

    #[test]
    fn below_one_lot_is_zero() {
        let sizer = sizer(SizingMethod::Fixed);
        // 47.5 cash → under one lot of a 10.0 stock.
        let volume = sizer.size(0.5, 10.0, 50.0, 50.0);
        assert_eq!(volume, 0);
    }

    #[test]
    fn volume_is_lot_multiple() {
        let sizer = sizer(SizingMethod::Percentage);
        for strength in [0.1, 0.33, 0.57, 0.99] {
            let volume = sizer.size(strength, 9.87, 500_000.0, 750_000.0);
            assert_eq!(volume % 100, 0, "strength {}", strength);
        }
    }

    #[test]
    fn non_positive_price_is_zero() {
        let sizer = sizer(SizingMethod::Percentage);
        assert_eq!(sizer.size(0.5, 0.0, 1_000_000.0, 1_000_000.0), 0);
        assert_eq!(sizer.size(0.5, -1.0, 1_000_000.0, 1_000_000.0), 0);
    }
}
