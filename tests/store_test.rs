//! Backend parity: the in-memory and SQLite stores answer every operation
//! with the same snapshots.

use sanguine::store::sqlite::SqliteStore;
use sanguine::store::{MemoryStore, Store};

async fn exercise_crud(store: &dyn Store) {
    assert!(store.list().await.unwrap().is_empty());

    let items = store.add("First entry").await.unwrap();
    assert_eq!(items.len(), 1);
    let first = items[0].clone();
    assert!(first.id > 0);
    assert_eq!(first.text, "First entry");
    assert!(!first.completed);

    let items = store.add("Second entry").await.unwrap();
    assert_eq!(items.len(), 2);
    let second = items[1].clone();
    assert!(second.id > first.id);

    let items = store.toggle(first.id).await.unwrap();
    assert!(items[0].completed);
    assert!(!items[1].completed);

    let items = store.update(second.id, "Second entry, reworded").await.unwrap();
    assert_eq!(items[1].text, "Second entry, reworded");
    assert!(items[0].completed);

    // Unknown ids change nothing.
    let before = store.list().await.unwrap();
    assert_eq!(store.toggle(9999).await.unwrap(), before);
    assert_eq!(store.update(9999, "ghost").await.unwrap(), before);
    assert_eq!(store.delete(9999).await.unwrap(), before);

    let items = store.delete(first.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, second.id);
}

#[tokio::test]
async fn memory_store_crud() {
    exercise_crud(&MemoryStore::new()).await;
}

#[tokio::test]
async fn sqlite_store_crud() {
    exercise_crud(&SqliteStore::in_memory().unwrap()).await;
}

#[tokio::test]
async fn backends_agree_on_snapshots() {
    let memory = MemoryStore::new();
    let sqlite = SqliteStore::in_memory().unwrap();

    for store in [&memory as &dyn Store, &sqlite as &dyn Store] {
        store.add("Shared first").await.unwrap();
        store.add("Shared second").await.unwrap();
        store.toggle(2).await.unwrap();
        store.delete(1).await.unwrap();
    }

    assert_eq!(
        memory.list().await.unwrap(),
        sqlite.list().await.unwrap()
    );
}

#[tokio::test]
async fn sqlite_store_survives_reopen_mid_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");
    let path_str = path.to_str().unwrap();

    {
        let store = SqliteStore::open(path_str).unwrap();
        store.add("Persisted entry").await.unwrap();
        store.toggle(1).await.unwrap();
    }

    let store = SqliteStore::open(path_str).unwrap();
    let items = store.list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Persisted entry");
    assert!(items[0].completed);
}
