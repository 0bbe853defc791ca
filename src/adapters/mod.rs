//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_audit_adapter;
pub mod dry_run_broker;
pub mod file_config_adapter;

pub use csv_adapter::CsvBarAdapter;
pub use csv_audit_adapter::CsvAuditAdapter;
pub use dry_run_broker::DryRunBroker;
pub use file_config_adapter::FileConfigAdapter;
