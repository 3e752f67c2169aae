//! Timetable client error types.

use crate::domain::DomainError;

use super::decode::DecodeError;

/// Errors from querying the timetable API.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by timetable API")]
    RateLimited,

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Request URL could not be built
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// Query cannot be sent upstream
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] DomainError),

    /// Pagination was asked to step past the known results
    #[error("no more results in that direction")]
    NoMoreResults,

    /// Fixture data missing or unreadable
    #[error("fixture error: {0}")]
    Fixture(String),
}
