mod database;
mod error;
mod id;
mod model;
mod store;

pub use database::{DatabaseError, DocumentDatabase, InMemoryDatabase};
#[cfg(feature = "couchdb")]
pub use database::{ConnectionProperties, CouchClient};
pub use error::StoreError;
pub use id::{CouchId, ModelId, PropertyType};
pub use model::{
    entity, CallbackStore, Entity, Model, ModelRepository, ModelsExt, Store, ID_FIELD,
};
pub use store::{CouchStore, DatabaseHandle, DatabaseResolver};

// Re-export the derive macro so `#[derive(Model)]` works next to the trait.
pub use couch_store_macros::Model;
