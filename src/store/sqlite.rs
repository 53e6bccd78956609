use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;

use super::Store;
use crate::item::Item;

/// SQLite-backed store. Use `":memory:"` for tests.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open items database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                text      TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0
            )",
        )
        .context("failed to create items table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn snapshot(conn: &Connection) -> Result<Vec<Item>> {
        let mut stmt = conn.prepare("SELECT id, text, completed FROM items ORDER BY id ASC")?;
        let items = stmt
            .query_map([], |row| {
                Ok(Item {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    completed: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list(&self) -> Result<Vec<Item>> {
        let conn = self.conn.lock().unwrap();
        Self::snapshot(&conn)
    }

    async fn add(&self, text: &str) -> Result<Vec<Item>> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO items (text) VALUES (?1)", [text])?;
        Self::snapshot(&conn)
    }

    async fn toggle(&self, id: i64) -> Result<Vec<Item>> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE items SET completed = 1 - completed WHERE id = ?1",
            [id],
        )?;
        Self::snapshot(&conn)
    }

    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE items SET text = ?1 WHERE id = ?2",
            rusqlite::params![text, id],
        )?;
        Self::snapshot(&conn)
    }

    async fn delete(&self, id: i64) -> Result<Vec<Item>> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
        Self::snapshot(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_toggle_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        let items = store.add("write the tests").await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].id > 0);
        assert!(!items[0].completed);

        let items = store.toggle(items[0].id).await.unwrap();
        assert!(items[0].completed);
    }

    #[tokio::test]
    async fn update_rewrites_text() {
        let store = SqliteStore::in_memory().unwrap();
        let items = store.add("draft text").await.unwrap();

        let items = store.update(items[0].id, "final text").await.unwrap();
        assert_eq!(items[0].text, "final text");
    }

    #[tokio::test]
    async fn missing_id_is_a_no_op() {
        let store = SqliteStore::in_memory().unwrap();
        let before = store.add("only item").await.unwrap();

        assert_eq!(store.toggle(999).await.unwrap(), before);
        assert_eq!(store.delete(999).await.unwrap(), before);
    }

    #[tokio::test]
    async fn ids_are_never_reused_after_delete() {
        let store = SqliteStore::in_memory().unwrap();
        let items = store.add("first item").await.unwrap();
        let first_id = items[0].id;

        store.delete(first_id).await.unwrap();
        let items = store.add("second item").await.unwrap();
        assert!(items[0].id > first_id);
    }

    #[tokio::test]
    async fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items-test.db");
        let path_str = path.to_str().unwrap();

        {
            let store = SqliteStore::open(path_str).unwrap();
            store.add("survives reopen").await.unwrap();
        }

        {
            let store = SqliteStore::open(path_str).unwrap();
            let items = store.list().await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].text, "survives reopen");
        }
    }
}
