//! Domain error types.

/// Top-level error type for quantrader.
#[derive(Debug, thiserror::Error)]
pub enum QuantraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("insufficient data for {instrument}: have {bars} bars, need {minimum}")]
    InsufficientData {
        instrument: String,
        bars: usize,
        minimum: usize,
    },

    #[error("broker error: {reason}")]
    Broker { reason: String },

    #[error("audit error: {reason}")]
    Audit { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantraderError> for std::process::ExitCode {
    fn from(err: &QuantraderError) -> Self {
        let code: u8 = match err {
            QuantraderError::Io(_) => 1,
            QuantraderError::ConfigParse { .. }
            | QuantraderError::ConfigMissing { .. }
            | QuantraderError::ConfigInvalid { .. } => 2,
            QuantraderError::Data { .. } => 3,
            QuantraderError::Broker { .. } | QuantraderError::Audit { .. } => 4,
            QuantraderError::NoData { .. } | QuantraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
