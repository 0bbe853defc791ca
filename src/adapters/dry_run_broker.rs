//! Dry-run broker adapter.
//!
//! Accepts every order without touching any market, assigning sequential
//! ids and keeping the submitted orders for inspection. Used by the
//! `signal` command and in tests.

use crate::domain::error::QuantraderError;
use crate::ports::broker_port::{BrokerPort, OrderId, OrderRequest};

#[derive(Debug, Default)]
pub struct DryRunBroker {
    submitted: Vec<OrderRequest>,
}

impl DryRunBroker {
    pub fn new() -> Self {
        DryRunBroker::default()
    }

    pub fn submitted(&self) -> &[OrderRequest] {
        &self.submitted
    }
}

impl BrokerPort for DryRunBroker {
    fn submit_order(&mut self, order: &OrderRequest) -> Result<OrderId, QuantraderError> {
        if order.volume <= 0 {
            return Err(QuantraderError::Broker {
                reason: format!("rejected order with volume {}", order.volume),
            });
        }
        self.submitted.push(order.clone());
        Ok(OrderId(format!("dry-{}", self.submitted.len())))
    }
}
