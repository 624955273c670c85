//! InMemoryDatabase - HashMap-backed document database for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{DatabaseError, DocumentDatabase, STATUS_BAD_REQUEST, STATUS_PRECONDITION_FAILED};

/// Internal stored representation of a document.
struct StoredDocument {
    rev: String,
    body: Map<String, Value>,
}

/// Documents of one database, ordered by id like `_all_docs`.
type Documents = BTreeMap<String, StoredDocument>;

/// In-memory document database with CouchDB revision semantics.
///
/// Every write bumps the revision generation (`1-…`, `2-…`); writes and
/// deletes must present the current revision or fail with 409. Clone-friendly
/// via Arc: clones share storage.
#[derive(Clone)]
pub struct InMemoryDatabase {
    storage: Arc<RwLock<HashMap<String, Documents>>>,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDatabase {
    /// Create a new database server with no databases.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Whether a database with this name exists.
    pub fn has_database(&self, name: &str) -> bool {
        self.storage
            .read()
            .map(|storage| storage.contains_key(name))
            .unwrap_or(false)
    }

    /// Number of documents in a database (0 when absent).
    pub fn document_count(&self, name: &str) -> usize {
        self.storage
            .read()
            .map(|storage| storage.get(name).map(|docs| docs.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    fn next_rev(previous: Option<&str>) -> String {
        let generation = previous
            .and_then(|rev| rev.split_once('-'))
            .and_then(|(generation, _)| generation.parse::<u64>().ok())
            .unwrap_or(0);
        format!("{}-{}", generation + 1, uuid::Uuid::new_v4().simple())
    }

    fn poisoned() -> DatabaseError {
        DatabaseError::transport("lock poisoned")
    }

    fn missing_database() -> DatabaseError {
        DatabaseError::not_found("Database does not exist.")
    }

    fn write_response(id: &str, rev: &str) -> Value {
        json!({ "ok": true, "id": id, "rev": rev })
    }

    /// Document body without reserved fields; `_id` and `_rev` are managed here.
    fn strip_reserved(document: Value) -> Result<Map<String, Value>, DatabaseError> {
        match document {
            Value::Object(mut body) => {
                body.remove("_id");
                body.remove("_rev");
                Ok(body)
            }
            _ => Err(DatabaseError::status(
                STATUS_BAD_REQUEST,
                "Document must be a JSON object",
            )),
        }
    }

    fn render(id: &str, stored: &StoredDocument) -> Value {
        let mut document = Map::new();
        document.insert("_id".into(), Value::String(id.to_string()));
        document.insert("_rev".into(), Value::String(stored.rev.clone()));
        for (key, value) in &stored.body {
            document.insert(key.clone(), value.clone());
        }
        Value::Object(document)
    }
}

#[async_trait]
impl DocumentDatabase for InMemoryDatabase {
    async fn create_database(&self, name: &str) -> Result<(), DatabaseError> {
        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        if storage.contains_key(name) {
            return Err(DatabaseError::status(
                STATUS_PRECONDITION_FAILED,
                "The database could not be created, the file already exists.",
            ));
        }
        storage.insert(name.to_string(), Documents::new());
        Ok(())
    }

    async fn delete_database(&self, name: &str) -> Result<(), DatabaseError> {
        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        storage
            .remove(name)
            .map(|_| ())
            .ok_or_else(Self::missing_database)
    }

    async fn retrieve(&self, db: &str, id: &str) -> Result<Value, DatabaseError> {
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        let documents = storage.get(db).ok_or_else(Self::missing_database)?;
        documents
            .get(id)
            .map(|stored| Self::render(id, stored))
            .ok_or_else(|| DatabaseError::not_found("missing"))
    }

    async fn retrieve_all(&self, db: &str, include_docs: bool) -> Result<Value, DatabaseError> {
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        let documents = storage.get(db).ok_or_else(Self::missing_database)?;

        let rows: Vec<Value> = documents
            .iter()
            .map(|(id, stored)| {
                let mut row = json!({
                    "id": id,
                    "key": id,
                    "value": { "rev": stored.rev },
                });
                if include_docs {
                    row["doc"] = Self::render(id, stored);
                }
                row
            })
            .collect();

        Ok(json!({
            "total_rows": rows.len(),
            "offset": 0,
            "rows": rows,
        }))
    }

    async fn create(&self, db: &str, document: Value) -> Result<Value, DatabaseError> {
        let requested_id = match document.get("_id") {
            None => None,
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(_) => {
                return Err(DatabaseError::status(
                    STATUS_BAD_REQUEST,
                    "Document id must be a non-empty string.",
                ))
            }
        };
        let body = Self::strip_reserved(document)?;

        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        let documents = storage.get_mut(db).ok_or_else(Self::missing_database)?;

        let id = requested_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        if documents.contains_key(&id) {
            return Err(DatabaseError::conflict("Document update conflict."));
        }

        let rev = Self::next_rev(None);
        documents.insert(
            id.clone(),
            StoredDocument {
                rev: rev.clone(),
                body,
            },
        );

        Ok(Self::write_response(&id, &rev))
    }

    async fn update(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        document: Value,
    ) -> Result<Value, DatabaseError> {
        let body = Self::strip_reserved(document)?;

        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        let documents = storage.get_mut(db).ok_or_else(Self::missing_database)?;
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| DatabaseError::not_found("missing"))?;

        if stored.rev != rev {
            return Err(DatabaseError::conflict("Document update conflict."));
        }

        stored.rev = Self::next_rev(Some(rev));
        stored.body = body;

        Ok(Self::write_response(id, &stored.rev))
    }

    async fn delete(
        &self,
        db: &str,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<(), DatabaseError> {
        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        let documents = storage.get_mut(db).ok_or_else(Self::missing_database)?;

        let current = documents.get(id).map(|stored| stored.rev.clone());
        match current {
            None if fail_on_not_found => Err(DatabaseError::not_found("missing")),
            None => Ok(()),
            Some(current) if current != rev => {
                Err(DatabaseError::conflict("Document update conflict."))
            }
            Some(_) => {
                documents.remove(id);
                Ok(())
            }
        }
    }
}
