pub mod http;
pub mod stub;

use anyhow::Result;
use async_trait::async_trait;

use crate::item::Item;

/// The network boundary. Could be a simulated server, a real one, or a
/// test script.
///
/// Every call settles in exactly one of two ways: the full authoritative
/// snapshot, or an error the dispatcher rolls back on. Reads (`fetch`) are
/// exempt from injected failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Item>>;
    async fn add(&self, text: &str) -> Result<Vec<Item>>;
    async fn toggle(&self, id: i64) -> Result<Vec<Item>>;
    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>>;
    async fn delete(&self, id: i64) -> Result<Vec<Item>>;
}
