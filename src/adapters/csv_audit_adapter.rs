//! Append-only CSV audit trail adapter.
//!
//! Signals, trades and risk checks each get their own file under the
//! audit directory. Headers are written once when a file is created;
//! subsequent runs append.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::domain::error::QuantraderError;
use crate::domain::position::Trade;
use crate::domain::risk::RiskCheckResult;
use crate::domain::signal::Signal;
use crate::ports::audit_port::AuditPort;

const SIGNALS_FILE: &str = "signals.csv";
const TRADES_FILE: &str = "trades.csv";
const RISK_FILE: &str = "risk_checks.csv";

pub struct CsvAuditAdapter {
    base_path: PathBuf,
}

impl CsvAuditAdapter {
    pub fn new(base_path: PathBuf) -> Result<Self, QuantraderError> {
        fs::create_dir_all(&base_path).map_err(|e| QuantraderError::Audit {
            reason: format!("cannot create {}: {}", base_path.display(), e),
        })?;
        Ok(Self { base_path })
    }

    fn open_with_header(&self, name: &str, header: &str) -> Result<File, QuantraderError> {
        let path = self.base_path.join(name);
        let new_file = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| QuantraderError::Audit {
                reason: format!("cannot open {}: {}", path.display(), e),
            })?;

        if new_file {
            writeln!(file, "{header}").map_err(|e| QuantraderError::Audit {
                reason: format!("cannot write header to {}: {}", path.display(), e),
            })?;
        }
        Ok(file)
    }

    fn append_record(
        &self,
        name: &str,
        header: &str,
        fields: &[String],
    ) -> Result<(), QuantraderError> {
        let file = self.open_with_header(name, header)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(fields)
            .and_then(|()| writer.flush().map_err(Into::into))
            .map_err(|e| QuantraderError::Audit {
                reason: format!("cannot append to {}: {}", name, e),
            })
    }
}

impl AuditPort for CsvAuditAdapter {
    fn record_signal(&mut self, signal: &Signal) -> Result<(), QuantraderError> {
        self.append_record(
            SIGNALS_FILE,
            "date,instrument,source,kind,strength,reference_price,rationale",
            &[
                signal.date.to_string(),
                signal.instrument.clone(),
                signal.source.to_string(),
                signal.kind.to_string(),
                format!("{:.4}", signal.strength),
                format!("{:.4}", signal.reference_price),
                signal.rationale.clone(),
            ],
        )
    }

    fn record_trade(&mut self, trade: &Trade) -> Result<(), QuantraderError> {
        self.append_record(
            TRADES_FILE,
            "date,instrument,side,price,volume,amount,commission,reason",
            &[
                trade.date.to_string(),
                trade.instrument.clone(),
                trade.side.to_string(),
                format!("{:.4}", trade.price),
                trade.volume.to_string(),
                format!("{:.2}", trade.amount),
                format!("{:.2}", trade.commission),
                trade.reason.to_string(),
            ],
        )
    }

    fn record_risk_check(&mut self, check: &RiskCheckResult) -> Result<(), QuantraderError> {
        self.append_record(
            RISK_FILE,
            "scope,level,action,detail",
            &[
                check.scope.to_string(),
                check.level.to_string(),
                check.action.to_string(),
                check.detail.clone(),
            ],
        )
    }
}
