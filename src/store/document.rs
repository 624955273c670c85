//! Raw document <-> entity conversion.
//!
//! This is the only place that inspects the shape of what the database hands
//! back; every shape problem becomes [`StoreError::InternalError`] here.

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::id::CouchId;
use crate::model::{Entity, ID_FIELD};

pub(crate) const DOC_ID: &str = "_id";
pub(crate) const DOC_REV: &str = "_rev";

/// The database reserves every top-level field starting with `_`.
fn is_reserved(key: &str) -> bool {
    key.starts_with('_')
}

fn describe(value: Option<&Value>, what: &str) -> String {
    match value {
        None => format!("Missing {}", what),
        Some(_) => format!("Unexpected type for {}", what),
    }
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>, StoreError> {
    match raw {
        Value::Object(map) => Ok(map),
        Value::Null => Err(StoreError::internal("No data in response from database")),
        _ => Err(StoreError::internal("Unexpected type in response from database")),
    }
}

fn string_field<'a>(
    document: &'a Map<String, Value>,
    key: &str,
    what: &str,
) -> Result<&'a str, StoreError> {
    document
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            StoreError::internal(format!("{} in document", describe(document.get(key), what)))
        })
}

fn entity_from(id: CouchId, document: &Map<String, Value>) -> Entity {
    let mut entity = Entity::new();
    entity.insert(ID_FIELD.to_string(), Value::String(id.into_string()));
    for (key, value) in document {
        if !is_reserved(key) {
            entity.insert(key.clone(), value.clone());
        }
    }
    entity
}

/// Decode a fetched document into an entity and its revision token.
pub(crate) fn decode(raw: &Value) -> Result<(Entity, String), StoreError> {
    let document = as_object(raw)?;
    let id = string_field(document, DOC_ID, "docid")?;
    let rev = string_field(document, DOC_REV, "rev")?;
    Ok((entity_from(CouchId::from(id), document), rev.to_string()))
}

/// Decode an `_all_docs` listing fetched with bodies. Any bad row fails the
/// whole listing.
pub(crate) fn decode_listing(raw: &Value) -> Result<Vec<Entity>, StoreError> {
    let listing = as_object(raw)?;
    let rows = match listing.get("rows") {
        Some(Value::Array(rows)) => rows,
        None => {
            return Err(StoreError::internal(
                "Missing document container retrieving documents",
            ))
        }
        Some(_) => {
            return Err(StoreError::internal(
                "Unexpected type for document container retrieving documents",
            ))
        }
    };

    rows.iter()
        .map(|row| {
            let document = row
                .get("doc")
                .and_then(Value::as_object)
                .ok_or_else(|| StoreError::internal("Missing body for document"))?;
            let id = string_field(document, DOC_ID, "docid")?;
            Ok(entity_from(CouchId::from(id), document))
        })
        .collect()
}

/// Drop reserved fields; they are never stored, so callers never see them.
pub(crate) fn without_reserved(mut entity: Entity) -> Entity {
    entity.retain(|key, _| !is_reserved(key));
    entity
}

/// Encode an entity for writing. The entity's own `"id"` and any reserved
/// fields are dropped; `explicit_id` becomes the document id.
pub(crate) fn encode(entity: Entity, explicit_id: Option<&CouchId>) -> Value {
    let mut entity = without_reserved(entity);
    entity.remove(ID_FIELD);
    if let Some(id) = explicit_id {
        entity.insert(DOC_ID.to_string(), Value::String(id.as_str().to_string()));
    }
    Value::Object(entity)
}

/// Read the document id confirmed by a write response.
pub(crate) fn written_id(response: &Value) -> Result<CouchId, StoreError> {
    let response = as_object(response)?;
    response
        .get("id")
        .and_then(Value::as_str)
        .map(CouchId::from)
        .ok_or_else(|| StoreError::internal("No valid ID in response from database"))
}
