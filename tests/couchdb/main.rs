//! CouchStore over HTTP against a local CouchDB-compatible server.
#![cfg(feature = "couchdb")]


use couch_store::{
    entity, ConnectionProperties, CouchClient, CouchId, CouchStore, DocumentDatabase,
    InMemoryDatabase, Model, Store, StoreError,
};
use serde_json::json;

#[derive(Model)]
struct User;

async fn connected() -> (CouchStore<CouchClient>, InMemoryDatabase) {
    let backend = InMemoryDatabase::new();
    let port = server::start(backend.clone()).await;
    let store = CouchStore::connect(&ConnectionProperties::new("127.0.0.1", port)).unwrap();
    (store, backend)
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let (store, backend) = connected().await;
    let id = CouchId::from("ada");

    let created = store
        .create::<User>(Some(&id), entity(json!({ "name": "Ada", "age": 36 })))
        .await
        .unwrap();
    assert_eq!(created["id"], json!("ada"));
    assert!(backend.has_database("user"));

    let updated = store
        .update::<User>(&id, entity(json!({ "age": 37 })))
        .await
        .unwrap();
    assert_eq!(updated, entity(json!({ "id": "ada", "name": "Ada", "age": 37 })));

    let stored = backend.retrieve("user", "ada").await.unwrap();
    assert!(stored["_rev"].as_str().unwrap().starts_with("2-"));

    let all = store.find_all::<User>().await.unwrap();
    assert_eq!(all, vec![updated.clone()]);

    let deleted = store.delete::<User>(&id).await.unwrap();
    assert_eq!(deleted, updated);
    assert_eq!(
        store.find_one::<User>(&id).await.unwrap_err(),
        StoreError::NotFound("ada".into())
    );
}

#[tokio::test]
async fn generated_ids_round_trip_over_http() {
    let (store, _backend) = connected().await;
    let created = store
        .create::<User>(None, entity(json!({ "name": "Grace" })))
        .await
        .unwrap();

    let id = store.make_id(&created["id"]);
    let found = store.find_one::<User>(id.as_ref()).await.unwrap();
    assert_eq!(found["name"], json!("Grace"));
}

#[tokio::test]
async fn conflicts_come_back_as_id_conflict() {
    let (store, _backend) = connected().await;
    let id = CouchId::from("ada");
    store
        .create::<User>(Some(&id), entity(json!({})))
        .await
        .unwrap();

    let err = store
        .create::<User>(Some(&id), entity(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::IdConflict("ada".into()));
}

#[tokio::test]
async fn ids_are_escaped_in_urls() {
    let (store, backend) = connected().await;
    let id = CouchId::from("a b/c?d");

    store
        .create::<User>(Some(&id), entity(json!({ "name": "odd" })))
        .await
        .unwrap();
    assert!(backend.retrieve("user", "a b/c?d").await.is_ok());

    let found = store.find_one::<User>(&id).await.unwrap();
    assert_eq!(found["id"], json!("a b/c?d"));
    store.delete::<User>(&id).await.unwrap();
    assert_eq!(backend.document_count("user"), 0);
}

#[tokio::test]
async fn unreachable_server_is_store_unavailable() {
    let port = server::closed_port().await;
    let store = CouchStore::connect(&ConnectionProperties::new("127.0.0.1", port)).unwrap();

    let err = store
        .find_one::<User>(&CouchId::from("ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::StoreUnavailable(_)));
    assert!(err.is_retryable());

    let err = store.delete_all::<User>().await.unwrap_err();
    assert!(matches!(err, StoreError::InternalError(_)));
}

#[tokio::test]
async fn non_json_success_body_is_internal_and_not_retryable() {
    let port = server::start_html().await;
    let store = CouchStore::connect(&ConnectionProperties::new("127.0.0.1", port)).unwrap();

    let err = store
        .find_one::<User>(&CouchId::from("ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InternalError(_)));
    assert!(!err.is_retryable());

    let err = store.find_all::<User>().await.unwrap_err();
    assert!(matches!(err, StoreError::InternalError(_)));
}

#[tokio::test]
async fn delete_all_over_http_is_idempotent() {
    let (store, backend) = connected().await;
    store
        .create::<User>(None, entity(json!({ "name": "Ada" })))
        .await
        .unwrap();

    store.delete_all::<User>().await.unwrap();
    assert!(!backend.has_database("user"));
    store.delete_all::<User>().await.unwrap();
}
