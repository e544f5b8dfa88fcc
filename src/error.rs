use thiserror::Error;

/// Every failure a trend request (or the process) can end with.
///
/// None of these are retried; each one is terminal for the current request.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing or unparsable required configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure, non-2xx status or undecodable upstream body.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Normalization left nothing to chart.
    #[error("{0}")]
    NotFound(String),

    /// Malformed caller input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The raw dump could not be written (only surfaced in strict mode).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A failure inside the service itself, such as a crashed worker.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Process exit code used by the `trend` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Validation(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::Upstream(_) | AppError::Persistence(_) => 4,
            AppError::Internal(_) => 1,
        }
    }
}

/// Failure of an [`ObservationSink`](crate::io::ObservationSink).
#[derive(Debug, Error)]
#[error("failed to write dump '{path}': {source}")]
pub struct PersistError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

impl From<PersistError> for AppError {
    fn from(err: PersistError) -> Self {
        AppError::Persistence(err.to_string())
    }
}
