//! ModelRepository - Typed accessor for model CRUD operations.

use std::marker::PhantomData;

use super::{Entity, Model, Store};
use crate::error::StoreError;
use crate::id::ModelId;

/// Typed repository wrapper for accessing entities of a specific model type.
pub struct ModelRepository<'a, S, M> {
    store: &'a S,
    _marker: PhantomData<M>,
}

impl<'a, S: Store, M: Model> ModelRepository<'a, S, M> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get an entity by ID.
    pub async fn find_one(&self, id: &dyn ModelId) -> Result<Entity, StoreError> {
        self.store.find_one::<M>(id).await
    }

    /// Get every entity.
    pub async fn find_all(&self) -> Result<Vec<Entity>, StoreError> {
        self.store.find_all::<M>().await
    }

    /// Create an entity, optionally under a caller-chosen ID.
    pub async fn create(
        &self,
        id: Option<&dyn ModelId>,
        entity: Entity,
    ) -> Result<Entity, StoreError> {
        self.store.create::<M>(id, entity).await
    }

    /// Merge fields into an existing entity.
    pub async fn update(&self, id: &dyn ModelId, entity: Entity) -> Result<Entity, StoreError> {
        self.store.update::<M>(id, entity).await
    }

    /// Delete an entity by ID, returning its last known state.
    pub async fn delete(&self, id: &dyn ModelId) -> Result<Entity, StoreError> {
        self.store.delete::<M>(id).await
    }

    /// Delete every entity.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        self.store.delete_all::<M>().await
    }
}

/// Extension trait for typed model access on any Store.
pub trait ModelsExt: Store + Sized {
    /// Get a typed model repository.
    fn models<M: Model>(&self) -> ModelRepository<'_, Self, M> {
        ModelRepository::new(self)
    }
}

impl<S: Store> ModelsExt for S {}
