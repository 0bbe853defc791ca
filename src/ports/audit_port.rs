//! Audit trail port trait.
//!
//! Every signal, order and risk decision the live cycle produces goes
//! through here. Recording failures must not abort trading, so callers
//! log and continue on error.

use crate::domain::error::QuantraderError;
use crate::domain::position::Trade;
use crate::domain::risk::RiskCheckResult;
use crate::domain::signal::Signal;

pub trait AuditPort {
    fn record_signal(&mut self, signal: &Signal) -> Result<(), QuantraderError>;
    fn record_trade(&mut self, trade: &Trade) -> Result<(), QuantraderError>;
    fn record_risk_check(&mut self, check: &RiskCheckResult) -> Result<(), QuantraderError>;
}
