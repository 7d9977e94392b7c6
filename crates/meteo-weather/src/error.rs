//! Fetch and query error types.

use std::sync::Arc;

use thiserror::Error;

/// Why a fetch from the upstream provider failed.
#[derive(Debug, Error)]
pub enum FetchCause {
    /// Connection failure, timeout, or an interrupted body.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The body was not a valid forecast document.
    #[error("malformed response body: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but its series don't line up.
    #[error("inconsistent response body: {0}")]
    Inconsistent(String),

    /// The refresh task ended before reporting an outcome.
    #[error("refresh aborted before completion")]
    Aborted,
}

/// A failed fetch, as seen by every caller that joined the refresh.
///
/// Cheap to clone; all clones share the same underlying cause. Displays as
/// the cause itself.
#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct FetchError {
    cause: Arc<FetchCause>,
}

impl FetchError {
    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }

    pub(crate) fn aborted() -> Self {
        FetchCause::Aborted.into()
    }

    /// True when the response body could not be turned into a snapshot.
    pub fn is_decode(&self) -> bool {
        matches!(
            *self.cause,
            FetchCause::Decode(_) | FetchCause::Inconsistent(_)
        )
    }

    /// Whether two errors came out of the same refresh.
    pub fn same_cycle(&self, other: &FetchError) -> bool {
        Arc::ptr_eq(&self.cause, &other.cause)
    }
}

impl From<FetchCause> for FetchError {
    fn from(cause: FetchCause) -> Self {
        Self {
            cause: Arc::new(cause),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchCause::Transport(e).into()
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchCause::Decode(e).into()
    }
}

/// Errors surfaced by the read projections.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The cache has never been populated and the refresh just attempted failed.
    #[error("weather data not yet available")]
    NotYetAvailable(#[source] FetchError),

    /// A refresh failed and stale data may not be served.
    #[error("weather refresh failed")]
    Fetch(#[source] FetchError),
}

impl QueryError {
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            Self::NotYetAvailable(e) | Self::Fetch(e) => e,
        }
    }
}
