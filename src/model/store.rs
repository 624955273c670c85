//! Store - Abstract async CRUD storage for model entities.

use async_trait::async_trait;
use serde_json::Value;

use super::{Entity, Model};
use crate::error::StoreError;
use crate::id::ModelId;

/// Abstract CRUD storage for model entities.
///
/// Every operation resolves exactly once, with either a usable result or a
/// [`StoreError`]. Id kind checks happen before the first await, so a foreign
/// id fails with [`StoreError::IdInvalid`] without touching the backend.
/// Stores never retry; retry policy belongs to the caller.
#[async_trait]
pub trait Store: Send + Sync {
    /// Build this store's identifier from a raw value.
    fn make_id(&self, raw: &Value) -> Box<dyn ModelId>;

    /// Check that `id` is of the kind this store produces.
    fn validate_id(&self, id: &dyn ModelId) -> Result<(), StoreError>;

    /// Fetch one entity by id.
    async fn find_one<M: Model>(&self, id: &dyn ModelId) -> Result<Entity, StoreError>;

    /// Fetch every entity of the model type. All-or-nothing.
    async fn find_all<M: Model>(&self) -> Result<Vec<Entity>, StoreError>;

    /// Create an entity, optionally under a caller-chosen id. Any `"id"` field
    /// in the payload is ignored.
    async fn create<M: Model>(
        &self,
        id: Option<&dyn ModelId>,
        entity: Entity,
    ) -> Result<Entity, StoreError>;

    /// Merge `entity` into the stored entity and return the stored result.
    async fn update<M: Model>(&self, id: &dyn ModelId, entity: Entity)
        -> Result<Entity, StoreError>;

    /// Delete an entity, returning its last known state.
    async fn delete<M: Model>(&self, id: &dyn ModelId) -> Result<Entity, StoreError>;

    /// Delete every entity of the model type. Succeeds when there is nothing to delete.
    async fn delete_all<M: Model>(&self) -> Result<(), StoreError>;
}
