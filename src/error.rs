use thiserror::Error;

/// Errors reported by a [`Store`](crate::Store).
///
/// The taxonomy is closed and store-agnostic: callers never see revision
/// tokens or HTTP statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entity exists with the given id.
    #[error("no entity found with id {0}")]
    NotFound(String),
    /// A write conflicted with the stored state of the given id.
    #[error("id conflict for {0}")]
    IdConflict(String),
    /// The id passed in is not of the kind this store produces.
    #[error("id {0} is not valid for this store")]
    IdInvalid(String),
    /// The store failed on its side; retrying later may succeed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// Unexpected response shape or a logic defect; retrying will not help.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl StoreError {
    pub fn internal(reason: impl Into<String>) -> Self {
        StoreError::InternalError(reason.into())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::StoreUnavailable(reason.into())
    }

    /// True for operational failures a caller may choose to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::StoreUnavailable(_))
    }
}
