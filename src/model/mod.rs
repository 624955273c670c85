//! Models - the generic persistence contract stores implement.
//!
//! A model type names a collection of entities; a [`Store`] persists entities
//! of any model type behind one uniform CRUD contract.
//!
//! ## Example
//!
//! ```ignore
//! use couch_store::{entity, CouchStore, InMemoryDatabase, Model, ModelsExt, Store};
//! use serde_json::json;
//!
//! #[derive(Model)]
//! struct User;
//!
//! let store = CouchStore::new(InMemoryDatabase::new());
//! let users = store.models::<User>();
//!
//! let created = users.create(None, entity(json!({ "name": "Ada" }))).await?;
//! let id = store.make_id(&created["id"]);
//! let loaded = users.find_one(id.as_ref()).await?;
//! ```

mod callback;
mod model_repository;
mod store;

use serde_json::{Map, Value};

/// Field name holding an entity's identifier.
pub const ID_FIELD: &str = "id";

/// A caller-visible record: field name to value, with the identifier under
/// [`ID_FIELD`].
pub type Entity = Map<String, Value>;

/// Trait for model types whose entities can be persisted.
///
/// Usually derived with `#[derive(Model)]`.
pub trait Model: Send + Sync + 'static {
    /// The model type name (e.g., "User").
    const TYPE_NAME: &'static str;

    /// Name of the database holding entities of this type: the lower-cased
    /// type name.
    fn database_name() -> String {
        Self::TYPE_NAME.to_lowercase()
    }
}

/// Build an entity from a JSON object literal. Non-objects yield an empty entity.
pub fn entity(value: Value) -> Entity {
    match value {
        Value::Object(map) => map,
        _ => Entity::new(),
    }
}

pub use callback::CallbackStore;
pub use model_repository::{ModelRepository, ModelsExt};
pub use store::Store;
