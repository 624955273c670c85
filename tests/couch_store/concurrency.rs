use std::sync::Arc;

use couch_store::{entity, CouchId, CouchStore, InMemoryDatabase, Store, StoreError};
use serde_json::json;

use crate::support::{GatedDatabase, User};

async fn seeded(parties: usize) -> CouchStore<GatedDatabase> {
    let inner = InMemoryDatabase::new();
    let seed = CouchStore::new(inner.clone());
    seed.create::<User>(Some(&CouchId::from("ada")), entity(json!({ "visits": 0 })))
        .await
        .unwrap();
    CouchStore::new(GatedDatabase::new(inner, parties))
}

#[tokio::test]
async fn racing_updates_on_one_revision_let_one_win() {
    let store = seeded(2).await;
    let id = CouchId::from("ada");

    let (first, second) = tokio::join!(
        store.update::<User>(&id, entity(json!({ "visits": 1, "by": "first" }))),
        store.update::<User>(&id, entity(json!({ "visits": 1, "by": "second" }))),
    );

    let outcomes = [first, second];
    let winners: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    let losers: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers, vec![&StoreError::IdConflict("ada".into())]);

    let stored = store.find_one::<User>(&id).await.unwrap();
    assert_eq!(&stored, winners[0]);
}

#[tokio::test]
async fn racing_deletes_on_one_revision_let_one_win() {
    let store = seeded(2).await;
    let id = CouchId::from("ada");

    let (first, second) = tokio::join!(store.delete::<User>(&id), store.delete::<User>(&id));

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| r == &Err(StoreError::NotFound("ada".into()))));
    assert_eq!(store.database().inner.document_count("user"), 0);
}

#[tokio::test]
async fn concurrent_creates_on_one_model_provision_once() {
    let store = Arc::new(CouchStore::new(InMemoryDatabase::new()));

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create::<User>(None, entity(json!({ "n": n })))
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(store.find_all::<User>().await.unwrap().len(), 8);
}
