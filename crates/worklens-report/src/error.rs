//! Error types for report assembly
//!
//! The taxonomy mirrors the report contract:
//! - configuration and remote failures are fatal for the whole request
//!   and arrive here wrapped from the store layer;
//! - malformed record fields are NOT errors — they decode to no-match
//!   values upstream and processing continues;
//! - empty results are a valid outcome, never an error.

use worklens_store::StoreError;

/// Errors surfaced by the report pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Store configuration or remote fetch failure; aborts the request.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The query parameters cannot be resolved into filters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ReportError {
    /// Whether this error originated in store configuration.
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Store(StoreError::Config(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert() {
        let err: ReportError = StoreError::Config("missing FRAPPE_URL".to_string()).into();
        assert!(err.is_config());
        assert!(err.to_string().contains("missing FRAPPE_URL"));
    }

    #[test]
    fn invalid_query_display() {
        let err = ReportError::InvalidQuery("bad from_date".to_string());
        assert_eq!(err.to_string(), "invalid query: bad from_date");
    }
}
