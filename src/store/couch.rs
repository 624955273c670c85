//! CouchStore - the CRUD contract over a revision-tracked document database.

use async_trait::async_trait;
use serde_json::Value;

use super::document;
use super::resolver::{DatabaseHandle, DatabaseResolver};
use super::translate::{translate, Operation};
use crate::database::{DatabaseError, DocumentDatabase};
use crate::error::StoreError;
use crate::id::{CouchId, ModelId};
use crate::model::{Entity, Model, Store, ID_FIELD};

/// [`Store`] backed by a CouchDB-style [`DocumentDatabase`].
///
/// Each model type lives in its own database, named after the lower-cased
/// type name. Revision tokens stay inside the store: `update` and `delete`
/// read the current revision first and present it with the write, so a
/// concurrent writer makes them fail with a conflict instead of silently
/// overwriting.
pub struct CouchStore<D> {
    database: D,
    resolver: DatabaseResolver,
}

impl<D: DocumentDatabase> CouchStore<D> {
    /// A store that provisions databases on every operation.
    pub fn new(database: D) -> Self {
        Self {
            database,
            resolver: DatabaseResolver::new(),
        }
    }

    /// A store that remembers provisioned databases. Cached handles are
    /// dropped again after transport failures and after `delete_all`.
    pub fn with_handle_cache(database: D) -> Self {
        Self {
            database,
            resolver: DatabaseResolver::cached(),
        }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Make sure `id` is a [`CouchId`].
    fn couch_id<'a>(&self, id: &'a dyn ModelId) -> Result<&'a CouchId, StoreError> {
        id.downcast_ref::<CouchId>()
            .ok_or_else(|| StoreError::IdInvalid(id.to_string()))
    }

    async fn resolve<M: Model>(&self) -> DatabaseHandle {
        self.resolver.resolve::<M, D>(&self.database).await
    }

    /// Translate a database failure, dropping the cached handle when the
    /// server side failed.
    fn fail(
        &self,
        handle: &DatabaseHandle,
        operation: Operation,
        id: Option<&CouchId>,
        err: DatabaseError,
    ) -> StoreError {
        if err.is_server_side() {
            log::warn!("{} on {} failed server side: {}", operation, handle.name(), err);
            self.resolver.invalidate(handle.name());
        }
        translate(operation, id, err)
    }

    /// Fetch an entity together with its current revision.
    async fn find_one_with_rev<M: Model>(
        &self,
        id: &CouchId,
    ) -> Result<(Entity, String), StoreError> {
        let handle = self.resolve::<M>().await;
        let raw = self
            .database
            .retrieve(handle.name(), id.as_str())
            .await
            .map_err(|err| self.fail(&handle, Operation::Retrieve, Some(id), err))?;
        document::decode(&raw)
    }
}

#[cfg(feature = "couchdb")]
impl CouchStore<crate::database::CouchClient> {
    /// A store talking to the CouchDB server described by `properties`.
    pub fn connect(
        properties: &crate::database::ConnectionProperties,
    ) -> Result<Self, DatabaseError> {
        Ok(Self::new(crate::database::CouchClient::new(properties)?))
    }
}

#[async_trait]
impl<D: DocumentDatabase> Store for CouchStore<D> {
    fn make_id(&self, raw: &Value) -> Box<dyn ModelId> {
        Box::new(CouchId::parse(raw))
    }

    fn validate_id(&self, id: &dyn ModelId) -> Result<(), StoreError> {
        self.couch_id(id).map(|_| ())
    }

    async fn find_one<M: Model>(&self, id: &dyn ModelId) -> Result<Entity, StoreError> {
        let id = self.couch_id(id)?;
        let (entity, _rev) = self.find_one_with_rev::<M>(id).await?;
        Ok(entity)
    }

    async fn find_all<M: Model>(&self) -> Result<Vec<Entity>, StoreError> {
        let handle = self.resolve::<M>().await;
        let raw = self
            .database
            .retrieve_all(handle.name(), true)
            .await
            .map_err(|err| self.fail(&handle, Operation::RetrieveAll, None, err))?;
        document::decode_listing(&raw).map_err(|err| {
            log::warn!("discarding listing of {}: {}", handle.name(), err);
            err
        })
    }

    async fn create<M: Model>(
        &self,
        id: Option<&dyn ModelId>,
        entity: Entity,
    ) -> Result<Entity, StoreError> {
        let id = id.map(|id| self.couch_id(id)).transpose()?;
        let handle = self.resolve::<M>().await;

        let body = document::encode(entity.clone(), id);
        let response = self
            .database
            .create(handle.name(), body)
            .await
            .map_err(|err| self.fail(&handle, Operation::Create, id, err))?;

        let created_id = document::written_id(&response)?;
        log::debug!("created {} in {}", created_id, handle.name());

        let mut result = document::without_reserved(entity);
        result.insert(ID_FIELD.to_string(), Value::String(created_id.into_string()));
        Ok(result)
    }

    async fn update<M: Model>(
        &self,
        id: &dyn ModelId,
        entity: Entity,
    ) -> Result<Entity, StoreError> {
        let id = self.couch_id(id)?;
        if let Some(new_id) = entity.get(ID_FIELD).map(CouchId::parse) {
            if &new_id != id {
                return Err(StoreError::internal("Changing id is not supported"));
            }
        }

        let (existing, rev) = self.find_one_with_rev::<M>(id).await?;

        let mut merged = existing;
        for (key, value) in entity {
            merged.insert(key, value);
        }
        merged.remove(ID_FIELD);

        let handle = self.resolve::<M>().await;
        let response = self
            .database
            .update(handle.name(), id.as_str(), &rev, document::encode(merged, None))
            .await
            .map_err(|err| self.fail(&handle, Operation::Update, Some(id), err))?;
        let updated_id = document::written_id(&response)?;

        // The write succeeded, so a missing document here is a stale read.
        match self.find_one_with_rev::<M>(&updated_id).await {
            Ok((entity, _rev)) => Ok(entity),
            Err(StoreError::NotFound(_)) => {
                log::warn!("{} vanished right after being updated", updated_id);
                Err(StoreError::internal("stale data reading updated document"))
            }
            Err(err) => Err(err),
        }
    }

    async fn delete<M: Model>(&self, id: &dyn ModelId) -> Result<Entity, StoreError> {
        let id = self.couch_id(id)?;
        let (entity, rev) = self.find_one_with_rev::<M>(id).await?;

        let handle = self.resolve::<M>().await;
        self.database
            .delete(handle.name(), id.as_str(), &rev, true)
            .await
            .map_err(|err| self.fail(&handle, Operation::Delete, Some(id), err))?;

        log::debug!("deleted {} from {}", id, handle.name());
        Ok(entity)
    }

    async fn delete_all<M: Model>(&self) -> Result<(), StoreError> {
        let name = M::database_name();
        self.resolver.invalidate(&name);
        match self.database.delete_database(&name).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(translate(Operation::DeleteDatabase, None, err)),
        }
    }
}
