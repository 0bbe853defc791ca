//! Port traits decoupling the domain from storage, brokerage and
//! configuration backends.

pub mod audit_port;
pub mod broker_port;
pub mod config_port;
pub mod data_port;

pub use audit_port::AuditPort;
pub use broker_port::{BrokerPort, OrderId, OrderRequest};
pub use config_port::ConfigPort;
pub use data_port::{MarketDataPort, RealtimeQuote};
