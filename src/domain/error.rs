//! Domain error types.

/// Rejections raised before a simulation is allowed to start.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no market data in the requested range")]
    NoData,

    #[error("market data provider error: {reason}")]
    Provider { reason: String },

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

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimError> for std::process::ExitCode {
    fn from(err: &SimError) -> Self {
        let code: u8 = match err {
            SimError::Io(_) => 1,
            SimError::ConfigParse { .. }
            | SimError::ConfigMissing { .. }
            | SimError::ConfigInvalid { .. } => 2,
            SimError::Validation(_) => 3,
            SimError::NoData => 4,
            SimError::Provider { .. } => 5,
            SimError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
