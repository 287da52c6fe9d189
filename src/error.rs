use thiserror::Error;

/// Failure taxonomy for a single scrape unit.
///
/// Severity is decided by the call site: a missing standings table aborts the
/// whole season run, while the same `NotFound` coming from a club or player
/// page is logged and the unit skipped.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("unexpected table shape: {detail}")]
    Parse { detail: String },
    #[error("http {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ScrapeError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::Parse {
            detail: detail.into(),
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
