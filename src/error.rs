use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("GitHub search failed: {0}")]
    FetchFailed(String),

    #[error("Record validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database write failed: {0}")]
    WriteFailed(String),

    #[error("Snapshot export failed: {0}")]
    ExportFailed(String),

    #[error("Environment error: {0}")]
    EnvError(String),
}

impl From<reqwest::Error> for HarvestError {
    // Connection errors, timeouts and non-success responses are all the
    // same transient kind as far as the caller's retry policy goes.
    fn from(err: reqwest::Error) -> Self {
        HarvestError::FetchFailed(err.to_string())
    }
}

impl HarvestError {
    /// Whether the operation that produced this error may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, HarvestError::FetchFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
