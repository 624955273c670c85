//! CouchDB-style store implementation.
//!
//! [`CouchStore`] maps the revision-free CRUD contract of [`Store`](crate::Store)
//! onto a database that requires the current revision for every mutation:
//!
//! - `document` converts raw documents to entities and back.
//! - `translate` maps database failures onto [`StoreError`](crate::StoreError).
//! - `resolver` maps model types to databases and provisions them.

mod couch;
mod document;
mod resolver;
mod translate;

pub use couch::CouchStore;
pub use resolver::{DatabaseHandle, DatabaseResolver};
