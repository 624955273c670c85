//! Test domain and database doubles for CouchStore tests.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use couch_store::{
    CouchStore, DatabaseError, DocumentDatabase, InMemoryDatabase, Model, ModelId, PropertyType,
};
use serde_json::Value;
use tokio::sync::Barrier;

#[derive(Model)]
pub struct User;

#[derive(Model)]
#[model(name = "Order")]
pub struct PurchaseOrder;

pub fn store() -> CouchStore<InMemoryDatabase> {
    CouchStore::new(InMemoryDatabase::new())
}

/// An id kind no CouchStore produces.
#[derive(Debug, Clone)]
pub struct ForeignId(pub u64);

impl fmt::Display for ForeignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "foreign-{}", self.0)
    }
}

impl ModelId for ForeignId {
    fn convert(&self, _to: PropertyType) -> Option<Value> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_clone(&self) -> Box<dyn ModelId> {
        Box::new(self.clone())
    }
}

/// Database calls that can be scripted on a [`ScriptedDatabase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    CreateDatabase,
    DeleteDatabase,
    Retrieve,
    RetrieveAll,
    Create,
    Update,
    Delete,
}

/// Wraps an [`InMemoryDatabase`], replacing chosen calls with scripted outcomes
/// and counting every call.
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    pub inner: InMemoryDatabase,
    scripts: Arc<Mutex<HashMap<(Call, usize), Result<Value, DatabaseError>>>>,
    counts: Arc<Mutex<HashMap<Call, usize>>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (1-based) call of this kind return `outcome`.
    pub fn script(&self, call: Call, nth: usize, outcome: Result<Value, DatabaseError>) {
        self.scripts.lock().unwrap().insert((call, nth), outcome);
    }

    pub fn calls(&self, call: Call) -> usize {
        self.counts.lock().unwrap().get(&call).copied().unwrap_or(0)
    }

    fn scripted(&self, call: Call) -> Option<Result<Value, DatabaseError>> {
        let nth = {
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(call).or_insert(0);
            *count += 1;
            *count
        };
        self.scripts.lock().unwrap().remove(&(call, nth))
    }
}

#[async_trait]
impl DocumentDatabase for ScriptedDatabase {
    async fn create_database(&self, name: &str) -> Result<(), DatabaseError> {
        match self.scripted(Call::CreateDatabase) {
            Some(outcome) => outcome.map(|_| ()),
            None => self.inner.create_database(name).await,
        }
    }

    async fn delete_database(&self, name: &str) -> Result<(), DatabaseError> {
        match self.scripted(Call::DeleteDatabase) {
            Some(outcome) => outcome.map(|_| ()),
            None => self.inner.delete_database(name).await,
        }
    }

    async fn retrieve(&self, db: &str, id: &str) -> Result<Value, DatabaseError> {
        match self.scripted(Call::Retrieve) {
            Some(outcome) => outcome,
            None => self.inner.retrieve(db, id).await,
        }
    }

    async fn retrieve_all(&self, db: &str, include_docs: bool) -> Result<Value, DatabaseError> {
        match self.scripted(Call::RetrieveAll) {
            Some(outcome) => outcome,
            None => self.inner.retrieve_all(db, include_docs).await,
        }
    }

    async fn create(&self, db: &str, document: Value) -> Result<Value, DatabaseError> {
        match self.scripted(Call::Create) {
            Some(outcome) => outcome,
            None => self.inner.create(db, document).await,
        }
    }

    async fn update(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        document: Value,
    ) -> Result<Value, DatabaseError> {
        match self.scripted(Call::Update) {
            Some(outcome) => outcome,
            None => self.inner.update(db, id, rev, document).await,
        }
    }

    async fn delete(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<(), DatabaseError> {
        match self.scripted(Call::Delete) {
            Some(outcome) => outcome.map(|_| ()),
            None => self.inner.delete(db, id, rev, fail_on_not_found).await,
        }
    }
}

/// Holds the first `parties` document reads until all of them have read, so
/// racing writers all see the same revision.
pub struct GatedDatabase {
    pub inner: InMemoryDatabase,
    gate: Barrier,
    parties: usize,
    reads: AtomicUsize,
}

impl GatedDatabase {
    pub fn new(inner: InMemoryDatabase, parties: usize) -> Self {
        Self {
            inner,
            gate: Barrier::new(parties),
            parties,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentDatabase for GatedDatabase {
    async fn create_database(&self, name: &str) -> Result<(), DatabaseError> {
        self.inner.create_database(name).await
    }

    async fn delete_database(&self, name: &str) -> Result<(), DatabaseError> {
        self.inner.delete_database(name).await
    }

    async fn retrieve(&self, db: &str, id: &str) -> Result<Value, DatabaseError> {
        let document = self.inner.retrieve(db, id).await;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.gate.wait().await;
        }
        document
    }

    async fn retrieve_all(&self, db: &str, include_docs: bool) -> Result<Value, DatabaseError> {
        self.inner.retrieve_all(db, include_docs).await
    }

    async fn create(&self, db: &str, document: Value) -> Result<Value, DatabaseError> {
        self.inner.create(db, document).await
    }

    async fn update(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        document: Value,
    ) -> Result<Value, DatabaseError> {
        self.inner.update(db, id, rev, document).await
    }

    async fn delete(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<(), DatabaseError> {
        self.inner.delete(db, id, rev, fail_on_not_found).await
    }
}
