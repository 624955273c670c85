//! Database error -> store error translation.

use std::fmt;

use crate::database::DatabaseError;
use crate::error::StoreError;
use crate::id::CouchId;

/// The database call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Retrieve,
    RetrieveAll,
    Create,
    Update,
    Delete,
    DeleteDatabase,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Retrieve => "retrieve",
            Operation::RetrieveAll => "retrieve all",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DeleteDatabase => "delete database",
        };
        f.write_str(name)
    }
}

/// Classify a database failure by its most specific signal.
///
/// Server-side failures become `StoreUnavailable` (except when deleting a
/// whole database, where every failure is internal). Not-found and conflict
/// only map to their own kinds for operations where they have a meaning for
/// the id involved; everywhere else they are internal errors.
pub(crate) fn translate(operation: Operation, id: Option<&CouchId>, err: DatabaseError) -> StoreError {
    log::debug!("{} failed for id {:?}: {}", operation, id.map(CouchId::as_str), err);

    if operation == Operation::DeleteDatabase {
        return StoreError::internal(err.to_string());
    }
    if err.is_server_side() {
        return StoreError::unavailable(err.to_string());
    }

    match (operation, id) {
        (Operation::Retrieve | Operation::Update | Operation::Delete, Some(id))
            if err.is_not_found() =>
        {
            StoreError::NotFound(id.to_string())
        }
        (Operation::Create | Operation::Update, Some(id)) if err.is_conflict() => {
            StoreError::IdConflict(id.to_string())
        }
        _ => StoreError::internal(err.to_string()),
    }
}
