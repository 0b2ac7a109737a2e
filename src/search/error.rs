//! Error types for search operations

use crate::error::AppError;

/// Errors that can occur during participant search.
///
/// Sub-query timeouts and store failures are absorbed by the orchestrator and
/// never appear here; only caller contract violations do.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    /// The search options violate the call contract
    #[error("Invalid search options: {0}")]
    InvalidOptions(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidOptions(msg) => AppError::Validation(msg),
        }
    }
}
