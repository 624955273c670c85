//! CallbackStore - completion-callback surface over any [`Store`].
//!
//! Each call checks the id kind synchronously and returns that failure as the
//! call's own `Err`. Otherwise the operation is spawned on the tokio runtime
//! and the callback runs exactly once with its outcome.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::{Entity, Model, Store};
use crate::error::StoreError;
use crate::id::ModelId;

/// Spawns store operations and reports their outcome through callbacks.
pub struct CallbackStore<S> {
    store: Arc<S>,
    runtime: Handle,
}

impl<S> Clone for CallbackStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: Store + 'static> CallbackStore<S> {
    pub fn new(store: Arc<S>, runtime: Handle) -> Self {
        Self { store, runtime }
    }

    /// Bind to the runtime of the calling context.
    pub fn current(store: Arc<S>) -> Result<Self, StoreError> {
        let runtime = Handle::try_current()
            .map_err(|e| StoreError::internal(format!("no tokio runtime: {}", e)))?;
        Ok(Self::new(store, runtime))
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn find_one<M, F>(&self, id: Box<dyn ModelId>, callback: F) -> Result<(), StoreError>
    where
        M: Model,
        F: FnOnce(Result<Entity, StoreError>) + Send + 'static,
    {
        self.store.validate_id(id.as_ref())?;
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.find_one::<M>(id.as_ref()).await);
        });
        Ok(())
    }

    pub fn find_all<M, F>(&self, callback: F)
    where
        M: Model,
        F: FnOnce(Result<Vec<Entity>, StoreError>) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.find_all::<M>().await);
        });
    }

    pub fn create<M, F>(
        &self,
        id: Option<Box<dyn ModelId>>,
        entity: Entity,
        callback: F,
    ) -> Result<(), StoreError>
    where
        M: Model,
        F: FnOnce(Result<Entity, StoreError>) + Send + 'static,
    {
        if let Some(id) = &id {
            self.store.validate_id(id.as_ref())?;
        }
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.create::<M>(id.as_deref(), entity).await);
        });
        Ok(())
    }

    pub fn update<M, F>(
        &self,
        id: Box<dyn ModelId>,
        entity: Entity,
        callback: F,
    ) -> Result<(), StoreError>
    where
        M: Model,
        F: FnOnce(Result<Entity, StoreError>) + Send + 'static,
    {
        self.store.validate_id(id.as_ref())?;
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.update::<M>(id.as_ref(), entity).await);
        });
        Ok(())
    }

    pub fn delete<M, F>(&self, id: Box<dyn ModelId>, callback: F) -> Result<(), StoreError>
    where
        M: Model,
        F: FnOnce(Result<Entity, StoreError>) + Send + 'static,
    {
        self.store.validate_id(id.as_ref())?;
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.delete::<M>(id.as_ref()).await);
        });
        Ok(())
    }

    pub fn delete_all<M, F>(&self, callback: F)
    where
        M: Model,
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        self.runtime.spawn(async move {
            callback(store.delete_all::<M>().await);
        });
    }
}
