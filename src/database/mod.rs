//! Databases - the revision-tracked document database underneath a store.
//!
//! [`DocumentDatabase`] is the seam between the adapter and the actual
//! CouchDB-compatible server. Documents travel as raw JSON so that all shape
//! checking stays in one place on the store side.
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryDatabase`]: in-process, for tests and development.
//! - `CouchClient` (feature `couchdb`): HTTP client for a real server.

mod in_memory;

#[cfg(feature = "couchdb")]
mod config;
#[cfg(feature = "couchdb")]
mod couchdb;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use in_memory::InMemoryDatabase;

#[cfg(feature = "couchdb")]
pub use config::ConnectionProperties;
#[cfg(feature = "couchdb")]
pub use couchdb::CouchClient;

pub(crate) const STATUS_BAD_REQUEST: u16 = 400;
pub(crate) const STATUS_NOT_FOUND: u16 = 404;
pub(crate) const STATUS_CONFLICT: u16 = 409;
pub(crate) const STATUS_PRECONDITION_FAILED: u16 = 412;

/// Error reported by a [`DocumentDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// The request never produced an answer (connection failure, poisoned
    /// state).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered with success but the body is not JSON.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The server answered with a non-success status.
    #[error("status {status}: {reason}")]
    Status { status: u16, reason: String },
}

impl DatabaseError {
    pub fn transport(reason: impl Into<String>) -> Self {
        DatabaseError::Transport(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        DatabaseError::Malformed(reason.into())
    }

    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        DatabaseError::Status {
            status,
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::status(STATUS_NOT_FOUND, reason)
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::status(STATUS_CONFLICT, reason)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            DatabaseError::Status { status, .. } => Some(*status),
            DatabaseError::Transport(_) | DatabaseError::Malformed(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(STATUS_NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(STATUS_CONFLICT)
    }

    /// Transport failures and 5xx answers: the server side is not serving.
    pub fn is_server_side(&self) -> bool {
        match self {
            DatabaseError::Transport(_) => true,
            DatabaseError::Malformed(_) => false,
            DatabaseError::Status { status, .. } => *status >= 500,
        }
    }
}

/// Operations a revision-tracked document database exposes.
///
/// Documents carry the reserved string fields `_id` and `_rev`. Write
/// responses are `{"ok": true, "id": ..., "rev": ...}`.
#[async_trait]
pub trait DocumentDatabase: Send + Sync {
    /// Create a database. Fails with 412 if it already exists.
    async fn create_database(&self, name: &str) -> Result<(), DatabaseError>;

    /// Delete a database. Fails with 404 if it does not exist.
    async fn delete_database(&self, name: &str) -> Result<(), DatabaseError>;

    /// Fetch one document, including `_id` and `_rev`.
    async fn retrieve(&self, db: &str, id: &str) -> Result<Value, DatabaseError>;

    /// List every document of a database, in `_all_docs` shape:
    /// `{"total_rows", "offset", "rows": [{"id", "key", "value": {"rev"}, "doc"}]}`.
    /// `doc` is only present when `include_docs` is set.
    async fn retrieve_all(&self, db: &str, include_docs: bool) -> Result<Value, DatabaseError>;

    /// Create a document. Uses `_id` from the body when present, otherwise the
    /// database assigns one.
    async fn create(&self, db: &str, document: Value) -> Result<Value, DatabaseError>;

    /// Replace a document, authorized by its current revision.
    async fn update(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        document: Value,
    ) -> Result<Value, DatabaseError>;

    /// Delete a document, authorized by its current revision. With
    /// `fail_on_not_found` unset a missing document is not an error.
    async fn delete(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<(), DatabaseError>;
}
