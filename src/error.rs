use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of the scan engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The base domain has fewer than two dot-separated labels (or is empty).
    #[error("invalid domain format: {0:?}")]
    InvalidDomainFormat(String),

    /// Anything unexpected inside an end-to-end scan. No partial report is returned.
    #[error("scan of {domain} failed: {source}")]
    ScanFailure {
        domain: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub fn scan_failure(domain: &str, source: impl Into<BoxError>) -> Self {
        Error::ScanFailure {
            domain: domain.to_string(),
            source: source.into(),
        }
    }
}

/// Failure of a single reputation lookup. Never aborts a scan.
#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("no reputation API key configured")]
    MissingApiKey,

    #[error("reputation service returned status {0}")]
    Status(u16),

    #[error("reputation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed reputation response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reputation lookup timed out")]
    Timeout,
}
