use thiserror::Error;

/// Main error type for the episode tracking and cadence core
#[derive(Error, Debug)]
pub enum TallyError {
    // Batch shape errors
    #[error("Invalid batch size for {field}: expected {expected}, got {actual}")]
    InvalidBatchSize {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    // Scheduler construction errors
    #[error("Degenerate cadence: {0}")]
    DegenerateCadence(String),

    // Collaborator errors
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for TallyError
pub type Result<T> = std::result::Result<T, TallyError>;

/// Specific error types for cadence construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CadenceError {
    #[error("epoch_len must be positive, got {0}")]
    ZeroEpochLen(u64),

    #[error("summary frequency must be a positive number of seconds, got {0}")]
    NonPositiveSummaryFrequency(f64),

    #[error("summary frequency of {0} seconds does not fit a duration")]
    SummaryFrequencyOutOfRange(f64),
}

impl From<CadenceError> for TallyError {
    fn from(err: CadenceError) -> Self {
        TallyError::DegenerateCadence(err.to_string())
    }
}

/// Fail with `InvalidBatchSize` unless `actual == expected`.
pub fn ensure_batch_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(TallyError::InvalidBatchSize {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
