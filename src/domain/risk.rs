//! Pre-trade risk controls.
//!
//! Four independent checks (daily loss, trailing drawdown, position
//! concentration, trade frequency) each grade the account into a level
//! and a prescribed action. The comprehensive check takes the worst
//! level and the most restrictive action across all four.

use chrono::{Duration, NaiveDate};
use std::fmt;

/// Severity grades, ordered from benign to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Prescribed responses, ordered from permissive to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskAction {
    Allow,
    Reduce,
    Stop,
    EmergencyExit,
}

impl RiskAction {
    /// Whether new entries are still permitted under this action.
    pub fn permits_trading(&self) -> bool {
        matches!(self, RiskAction::Allow | RiskAction::Reduce)
    }
}

impl fmt::Display for RiskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskAction::Allow => "allow",
            RiskAction::Reduce => "reduce",
            RiskAction::Stop => "stop",
            RiskAction::EmergencyExit => "emergency_exit",
        };
        write!(f, "{s}")
    }
}

/// Which control produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskScope {
    DailyLoss,
    Drawdown,
    Concentration,
    Frequency,
    Comprehensive,
}

impl fmt::Display for RiskScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskScope::DailyLoss => "daily_loss",
            RiskScope::Drawdown => "drawdown",
            RiskScope::Concentration => "concentration",
            RiskScope::Frequency => "frequency",
            RiskScope::Comprehensive => "comprehensive",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct RiskCheckResult {
    pub scope: RiskScope,
    pub level: RiskLevel,
    pub action: RiskAction,
    pub detail: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskLimits {
    /// Daily realized loss as a fraction of total assets.
    pub max_daily_loss: f64,
    /// Trailing drawdown on the 30-day cumulative P&L curve.
    pub max_drawdown: f64,
    /// Largest single position as a fraction of total assets.
    pub max_single_position: f64,
    pub max_daily_trades: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        RiskLimits {
            max_daily_loss: 0.05,
            max_drawdown: 0.15,
            max_single_position: 0.30,
            max_daily_trades: 10,
        }
    }
}

/// Account state snapshot the controller grades.
#[derive(Debug, Clone)]
pub struct RiskInputs<'a> {
    pub daily_realized_pnl: f64,
    pub total_asset: f64,
    pub position_value: f64,
    pub todays_trades: usize,
    /// Realized P&L per day, oldest first.
    pub pnl_history: &'a [(NaiveDate, f64)],
    pub as_of: NaiveDate,
}

const DRAWDOWN_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct RiskController {
    limits: RiskLimits,
}

impl RiskController {
    pub fn new(limits: RiskLimits) -> Self {
        RiskController { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn check_daily_loss(&self, daily_realized_pnl: f64, total_asset: f64) -> RiskCheckResult {
        let loss_ratio = if daily_realized_pnl < 0.0 && total_asset > 0.0 {
            -daily_realized_pnl / total_asset
        } else {
            0.0
        };

        let limit = self.limits.max_daily_loss;
        let (level, action) = if loss_ratio >= limit {
            (RiskLevel::Critical, RiskAction::Stop)
        } else if loss_ratio >= 0.8 * limit {
            (RiskLevel::High, RiskAction::Reduce)
        } else if loss_ratio >= 0.5 * limit {
            (RiskLevel::Medium, RiskAction::Allow)
        } else {
            (RiskLevel::Low, RiskAction::Allow)
        };

        RiskCheckResult {
            scope: RiskScope::DailyLoss,
            level,
            action,
            detail: format!("daily loss {:.2}% of assets", loss_ratio * 100.0),
        }
    }

    /// Drawdown on the cumulative P&L curve over the trailing 30 days.
    pub fn check_drawdown(
        &self,
        pnl_history: &[(NaiveDate, f64)],
        as_of: NaiveDate,
    ) -> RiskCheckResult {
        let cutoff = as_of - Duration::days(DRAWDOWN_WINDOW_DAYS);
        let mut cumulative = 0.0;
        let mut curve: Vec<f64> = Vec::new();
        for &(date, pnl) in pnl_history {
            if date > cutoff && date <= as_of {
                cumulative += pnl;
                curve.push(cumulative);
            }
        }

        let mut peak = f64::MIN;
        let mut max_dd: f64 = 0.0;
        for &value in &curve {
            if value > peak {
                peak = value;
            }
            if peak.abs() > 0.0 {
                let dd = (peak - value) / peak.abs();
                if dd > max_dd {
                    max_dd = dd;
                }
            }
        }

        let limit = self.limits.max_drawdown;
        let (level, action) = if max_dd >= limit {
            (RiskLevel::Critical, RiskAction::EmergencyExit)
        } else if max_dd >= 0.8 * limit {
            (RiskLevel::High, RiskAction::Reduce)
        } else {
            (RiskLevel::Low, RiskAction::Allow)
        };

        RiskCheckResult {
            scope: RiskScope::Drawdown,
            level,
            action,
            detail: format!("trailing drawdown {:.2}%", max_dd * 100.0),
        }
    }

    pub fn check_concentration(&self, position_value: f64, total_asset: f64) -> RiskCheckResult {
        let ratio = if total_asset > 0.0 {
            position_value / total_asset
        } else {
            0.0
        };

        let limit = self.limits.max_single_position;
        let (level, action) = if ratio >= limit {
            (RiskLevel::High, RiskAction::Reduce)
        } else if ratio >= 0.9 * limit {
            (RiskLevel::Medium, RiskAction::Allow)
        } else {
            (RiskLevel::Low, RiskAction::Allow)
        };

        RiskCheckResult {
            scope: RiskScope::Concentration,
            level,
            action,
            detail: format!("position {:.2}% of assets", ratio * 100.0),
        }
    }

    pub fn check_frequency(&self, todays_trades: usize) -> RiskCheckResult {
        let cap = self.limits.max_daily_trades;
        let (level, action) = if todays_trades >= cap {
            (RiskLevel::High, RiskAction::Stop)
        } else if todays_trades as f64 >= 0.8 * cap as f64 {
            (RiskLevel::Medium, RiskAction::Allow)
        } else {
            (RiskLevel::Low, RiskAction::Allow)
        };

        RiskCheckResult {
            scope: RiskScope::Frequency,
            level,
            action,
            detail: format!("{todays_trades} trades today, cap {cap}"),
        }
    }

    /// Worst level and most restrictive action across all four checks.
    pub fn comprehensive(&self, inputs: &RiskInputs<'_>) -> RiskCheckResult {
        let checks = [
            self.check_daily_loss(inputs.daily_realized_pnl, inputs.total_asset),
            self.check_drawdown(inputs.pnl_history, inputs.as_of),
            self.check_concentration(inputs.position_value, inputs.total_asset),
            self.check_frequency(inputs.todays_trades),
        ];

        let mut level = RiskLevel::Low;
        let mut action = RiskAction::Allow;
        let mut details: Vec<String> = Vec::new();
        for check in &checks {
            level = level.max(check.level);
            action = action.max(check.action);
            if check.level > RiskLevel::Low {
                details.push(format!("{}: {}", check.scope, check.detail));
            }
        }

        let detail = if details.is_empty() {
            "all checks clear".to_string()
        } else {
            details.join("; ")
        };

        RiskCheckResult {
            scope: RiskScope::Comprehensive,
            level,
            action,
            detail,
        }
    }
}
