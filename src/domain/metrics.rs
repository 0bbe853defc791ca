//! Performance metrics over a completed backtest.

use chrono::NaiveDate;

use crate::domain::position::{Trade, TradeSide};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// (final - initial) / initial. Zero when `initial` is not positive.
pub fn total_return(initial: f64, final_equity: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_equity - initial) / initial
}

/// Geometric annualization over the calendar span of the test. Zero when
/// the span is zero days or the total return cannot be annualized.
pub fn annualized_return(total_return: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;
    if years <= 0.0 || total_return <= -1.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(1.0 / years) - 1.0
}

/// Largest peak-to-trough decline of the equity curve, as a positive
/// fraction of the peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst.abs()
}

/// Annualized Sharpe ratio over daily returns, using the sample standard
/// deviation. Zero when fewer than two returns or the returns are flat.
/// `risk_free_rate` is annual.
pub fn sharpe_ratio(daily_returns: &[f64], risk_free_rate: f64) -> f64 {
    let n = daily_returns.len();
    if n < 2 {
        return 0.0;
    }

    let mean = daily_returns.iter().sum::<f64>() / n as f64;
    let variance = daily_returns
        .iter()
        .map(|r| {
            let d = r - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1) as f64;
    let std = variance.sqrt();
    if std == 0.0 {
        return 0.0;
    }

    (mean * TRADING_DAYS_PER_YEAR - risk_free_rate) / (std * TRADING_DAYS_PER_YEAR.sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    /// Mean P&L of the winning round trips; zero when there are none.
    pub avg_win: f64,
    /// Mean absolute P&L of the losing round trips; zero when there are none.
    pub avg_loss: f64,
    /// Gross wins over gross losses; infinite when there are wins but no
    /// losses, zero when there are no closed round trips.
    pub profit_factor: f64,
}

/// Round-trip statistics from the raw trade list. Each buy pairs with the
/// first unmatched sell that follows it; unmatched trades contribute to
/// `total_trades` only. Round-trip P&L nets out both commissions over the
/// smaller of the two volumes.
pub fn trade_statistics(trades: &[Trade]) -> TradeStats {
    let mut sell_used = vec![false; trades.len()];
    let mut pnls: Vec<f64> = Vec::new();

    for (i, buy) in trades.iter().enumerate() {
        if buy.side != TradeSide::Buy {
            continue;
        }
        for (j, sell) in trades.iter().enumerate().skip(i + 1) {
            if sell.side != TradeSide::Sell || sell_used[j] {
                continue;
            }
            let volume = buy.volume.min(sell.volume) as f64;
            let pnl = (sell.price - buy.price) * volume - buy.commission - sell.commission;
            pnls.push(pnl);
            sell_used[j] = true;
            break;
        }
    }

    if pnls.is_empty() {
        return TradeStats {
            total_trades: trades.len(),
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            profit_factor: 0.0,
        };
    }

    let winning_trades = pnls.iter().filter(|&&p| p > 0.0).count();
    let losing_trades = pnls.iter().filter(|&&p| p < 0.0).count();
    let gross_wins: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
    let gross_losses: f64 = pnls.iter().filter(|&&p| p < 0.0).sum();

    let profit_factor = if gross_losses == 0.0 {
        if gross_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_wins / gross_losses.abs()
    };

    let avg_win = if winning_trades > 0 {
        gross_wins / winning_trades as f64
    } else {
        0.0
    };
    let avg_loss = if losing_trades > 0 {
        gross_losses.abs() / losing_trades as f64
    } else {
        0.0
    };

    TradeStats {
        total_trades: trades.len(),
        winning_trades,
        losing_trades,
        win_rate: winning_trades as f64 / pnls.len() as f64,
        avg_win,
        avg_loss,
        profit_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::TradeReason;
    use approx::assert_relative_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_trade(day: u32, side: TradeSide, price: f64, volume: i64) -> Trade {
        Trade {
            date: date(day),
            instrument: "600000".to_string(),
            side,
            price,
            volume,
            amount: price * volume as f64,
            commission: 10.0,
            reason: TradeReason::Signal {
                rationale: "test".to_string(),
            },
        }
    }

    #[test]
    fn total_return_basic() {
        assert!((total_return(100_000.0, 110_000.0) - 0.1).abs() < 1e-12);
        assert!((total_return(100_000.0, 90_000.0) - (-0.1)).abs() < 1e-12);
        assert!((total_return(0.0, 100.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn annualized_return_one_year() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let annual = annualized_return(0.10, start, end);

        // 365 days is just under a year, so slightly above 10%.
        assert!(annual > 0.095 && annual < 0.105);
    }

    #[test]
    fn annualized_return_two_years_compounds() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let annual = annualized_return(0.21, start, end);

        // sqrt(1.21) - 1 = 10%.
        assert!((annual - 0.10).abs() < 0.005);
    }

    #[test]
    fn annualized_return_zero_span() {
        let day = date(5);
        assert!((annualized_return(0.5, day, day) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_drawdown_simple_decline() {
        let equity = vec![100.0, 120.0, 90.0, 110.0];
        // Peak 120 → trough 90 → 25%.
        assert_relative_eq!(max_drawdown(&equity), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn max_drawdown_peak_then_trough() {
        let equity = vec![100_000.0, 110_000.0, 90_000.0, 95_000.0];
        assert_relative_eq!(max_drawdown(&equity), 20_000.0 / 110_000.0, max_relative = 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_rise_is_zero() {
        let equity = vec![100.0, 105.0, 110.0, 120.0];
        assert!((max_drawdown(&equity) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_drawdown_empty() {
        assert!((max_drawdown(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_drawdown_in_unit_interval() {
        let equity = vec![100.0, 50.0, 10.0, 5.0];
        let dd = max_drawdown(&equity);
        assert!((0.0..=1.0).contains(&dd));
    }

    #[test]
    fn sharpe_flat_returns_is_zero() {
        let returns = vec![0.001; 10];
        assert!((sharpe_ratio(&returns, 0.03) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_too_few_returns_is_zero() {
        assert!((sharpe_ratio(&[], 0.03) - 0.0).abs() < f64::EPSILON);
        assert!((sharpe_ratio(&[0.01], 0.03) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        let returns: Vec<f64> = (0..40).map(|i| 0.002 + 0.0005 * (i % 3) as f64).collect();
        assert!(sharpe_ratio(&returns, 0.03) > 0.0);
    }

    #[test]
    fn sharpe_matches_hand_calculation() {
        let returns = vec![0.01, -0.005, 0.02, 0.0];
        let mean = returns.iter().sum::<f64>() / 4.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;
        let expected = (mean * 252.0 - 0.03) / (var.sqrt() * 252.0_f64.sqrt());

        assert_relative_eq!(sharpe_ratio(&returns, 0.03), expected, max_relative = 1e-12);
    }

    #[test]
    fn trade_statistics_pairs_buy_with_next_sell() {
        let trades = vec![
            make_trade(1, TradeSide::Buy, 10.0, 1000),
            make_trade(5, TradeSide::Sell, 11.0, 1000),
            make_trade(8, TradeSide::Buy, 11.0, 1000),
            make_trade(12, TradeSide::Sell, 10.0, 1000),
        ];
        let stats = trade_statistics(&trades);

        assert_eq!(stats.total_trades, 4);
        // Pair 1: +1000 - 20 = +980; pair 2: -1000 - 20 = -1020.
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 1);
        assert!((stats.win_rate - 0.5).abs() < f64::EPSILON);
        assert!((stats.avg_win - 980.0).abs() < 1e-9);
        assert!((stats.avg_loss - 1020.0).abs() < 1e-9);
        assert!((stats.profit_factor - 980.0 / 1020.0).abs() < 1e-12);
    }

    #[test]
    fn trade_statistics_partial_exit_uses_min_volume() {
        let trades = vec![
            make_trade(1, TradeSide::Buy, 10.0, 1000),
            make_trade(5, TradeSide::Sell, 12.0, 500),
        ];
        let stats = trade_statistics(&trades);

        // (12 - 10) * 500 - 20 = 980 > 0.
        assert_eq!(stats.winning_trades, 1);
        assert!((stats.win_rate - 1.0).abs() < f64::EPSILON);
        assert!((stats.avg_win - 980.0).abs() < 1e-9);
        assert!((stats.avg_loss - 0.0).abs() < f64::EPSILON);
        assert!(stats.profit_factor.is_infinite());
    }

    #[test]
    fn trade_statistics_no_round_trips() {
        let trades = vec![make_trade(1, TradeSide::Buy, 10.0, 1000)];
        let stats = trade_statistics(&trades);

        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.winning_trades, 0);
        assert!((stats.win_rate - 0.0).abs() < f64::EPSILON);
        assert!((stats.profit_factor - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trade_statistics_empty() {
        let stats = trade_statistics(&[]);
        assert_eq!(stats.total_trades, 0);
        assert!((stats.win_rate - 0.0).abs() < f64::EPSILON);
    }
}
