//! Order submission port trait.

use crate::domain::error::QuantraderError;
use crate::domain::position::TradeSide;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub instrument: String,
    pub side: TradeSide,
    pub price: f64,
    pub volume: i64,
}

pub trait BrokerPort {
    fn submit_order(&mut self, order: &OrderRequest) -> Result<OrderId, QuantraderError>;
}
