//! Store error types
//!
//! A failed remote call aborts the whole report request, so every
//! variant here is terminal for the caller. Reads are idempotent; a
//! retry policy could wrap an implementation without changing this
//! contract.

/// Errors surfaced by [`crate::RecordStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Required configuration (base URL, credentials) is missing or invalid.
    #[error("store configuration error: {0}")]
    Config(String),

    /// The remote store rejected or failed the request.
    #[error("remote store error (status {status}): {message}")]
    Remote {
        /// HTTP-like status code from the backend.
        status: u16,
        /// Message carried back to the caller.
        message: String,
    },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The query cannot be expressed against this store.
    #[error("invalid store query: {0}")]
    InvalidQuery(String),
}
