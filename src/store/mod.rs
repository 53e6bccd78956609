pub mod sqlite;

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use crate::consts::SEED_TEXTS;
use crate::item::Item;

/// What the server remembers. Could be in-memory, SQLite, a real database.
///
/// Every operation answers with the full snapshot so callers never see a
/// partial update; a mutation naming an absent id is a no-op that still
/// returns the current snapshot.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>>;
    async fn add(&self, text: &str) -> Result<Vec<Item>>;
    async fn toggle(&self, id: i64) -> Result<Vec<Item>>;
    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>>;
    async fn delete(&self, id: i64) -> Result<Vec<Item>>;
}

/// In-memory store. The state is owned by whoever constructed it and
/// injected where needed — not a module-level mutable array shared behind
/// everyone's back.
pub struct MemoryStore {
    items: Mutex<Vec<Item>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// A store pre-populated with the usual demo items.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut items = store.items.lock().unwrap();
            for text in SEED_TEXTS {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst);
                items.push(Item::new(id, *text));
            }
        }
        store
    }

    fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(&self) -> Result<Vec<Item>> {
        Ok(self.snapshot())
    }

    async fn add(&self, text: &str) -> Result<Vec<Item>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock().unwrap();
        items.push(Item::new(id, text));
        Ok(items.clone())
    }

    async fn toggle(&self, id: i64) -> Result<Vec<Item>> {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.completed = !item.completed;
        }
        Ok(items.clone())
    }

    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>> {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.text = text.to_string();
        }
        Ok(items.clone())
    }

    async fn delete(&self, id: i64) -> Result<Vec<Item>> {
        let mut items = self.items.lock().unwrap();
        items.retain(|i| i.id != id);
        Ok(items.clone())
    }
}
