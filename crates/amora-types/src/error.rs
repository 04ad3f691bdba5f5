use thiserror::Error;

/// Errors from the external document store.
///
/// The store distinguishes these failure modes; the resilient fetcher only
/// cares whether a call failed at all.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index not found: {0}")]
    IndexMissing(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("document not found")]
    NotFound,
}

/// Errors surfaced by content listing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Even the unordered fallback scan failed.
    #[error("content unavailable in '{collection}': {source}")]
    Unavailable {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// The consumer went away before the fetch finished.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Errors from the object store.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("invalid upload credentials: {0}")]
    InvalidCredentials(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("object store I/O error: {0}")]
    Io(String),
}

/// Errors from the notification permission probe.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notifications are not supported on this platform")]
    Unsupported,

    #[error("permission probe failed: {0}")]
    ProbeFailed(String),
}

/// Errors from the upload flow.
///
/// A policy rejection is not listed here; it is an `UploadOutcome`.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload: {0}")]
    Validation(String),

    /// The usage lookup failed; the upload may succeed on retry.
    #[error("upload quota could not be checked, try again: {0}")]
    UsageUnavailable(String),

    #[error("object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
