//! Identifiers - store-specific ids behind a shared capability contract.
//!
//! Upstream persistence code only ever holds a `Box<dyn ModelId>` (or a
//! `&dyn ModelId`). Each store produces its own concrete id type through
//! [`Store::make_id`](crate::Store::make_id) and rejects ids of any other kind
//! with [`StoreError::IdInvalid`](crate::StoreError::IdInvalid).
//!
//! ## Example
//!
//! ```ignore
//! use couch_store::{CouchId, ModelId, PropertyType};
//! use serde_json::json;
//!
//! let id = CouchId::parse(&json!(42));
//! assert_eq!(id.to_string(), "42");
//! assert_eq!(id.convert(PropertyType::Number), Some(json!(42)));
//! ```

mod couch_id;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use couch_id::CouchId;

/// Property kinds of the generic model/property-type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Date,
}

/// Capability contract every store identifier satisfies.
///
/// `Display` renders the id in the primitive string form accepted by the
/// underlying store.
pub trait ModelId: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Coerce the id into a value of the given property kind, if it has a
    /// representation of that kind.
    fn convert(&self, to: PropertyType) -> Option<Value>;

    /// Concrete type access, used by stores to check the id kind.
    fn as_any(&self) -> &dyn Any;

    /// Clone into a new boxed id.
    fn boxed_clone(&self) -> Box<dyn ModelId>;
}

impl Clone for Box<dyn ModelId> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

impl dyn ModelId {
    /// Downcast to a concrete id type.
    pub fn downcast_ref<T: ModelId>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
