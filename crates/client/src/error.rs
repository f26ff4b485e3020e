//! Errors shared by the read-only operations.
//!
//! Each component defines its own error for its mutations. Fetches (catalog,
//! cart listing, order history) all fail the same way and share
//! [`FetchError`]. Empty result sets are values, never errors.

use reqwest::StatusCode;
use thiserror::Error;

use crate::gateway::GatewayError;

/// An authenticated operation was attempted without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Not logged in")]
pub struct NotAuthenticated;

/// Errors from fetching a listing from the backend.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No session is active.
    #[error(transparent)]
    NotAuthenticated(#[from] NotAuthenticated),

    /// The backend answered with a non-success status.
    #[error("Request failed (HTTP {status})")]
    Rejected {
        /// The response status.
        status: StatusCode,
    },

    /// The backend could not be reached or sent an unexpected body.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for FetchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, .. } => Self::Rejected { status },
            other => Self::Gateway(other),
        }
    }
}

/// Result type alias for `FetchError`.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
