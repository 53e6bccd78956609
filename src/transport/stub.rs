use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::Transport;
use crate::fault::FaultInjector;
use crate::item::Item;
use crate::store::Store;

/// A simulated remote: a store wrapped in latency and injected failure.
///
/// Mutations sleep, then consult the fault injector; a failed mutation
/// never reaches the store. Fetches sleep but always succeed.
pub struct StubTransport {
    store: Arc<dyn Store>,
    latency: Duration,
    faults: Arc<FaultInjector>,
}

impl StubTransport {
    pub fn new(store: Arc<dyn Store>, latency: Duration, faults: Arc<FaultInjector>) -> Self {
        Self {
            store,
            latency,
            faults,
        }
    }

    /// Zero-latency stub, for tests and impatient demos.
    pub fn instant(store: Arc<dyn Store>, faults: Arc<FaultInjector>) -> Self {
        Self::new(store, Duration::ZERO, faults)
    }

    async fn simulate_mutation(&self) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        if self.faults.should_fail() {
            bail!("injected server error");
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn fetch(&self) -> Result<Vec<Item>> {
        tokio::time::sleep(self.latency).await;
        self.store.list().await
    }

    async fn add(&self, text: &str) -> Result<Vec<Item>> {
        self.simulate_mutation().await?;
        self.store.add(text).await
    }

    async fn toggle(&self, id: i64) -> Result<Vec<Item>> {
        self.simulate_mutation().await?;
        self.store.toggle(id).await
    }

    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>> {
        self.simulate_mutation().await?;
        self.store.update(id, text).await
    }

    async fn delete(&self, id: i64) -> Result<Vec<Item>> {
        self.simulate_mutation().await?;
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultPlan;
    use crate::store::MemoryStore;

    fn stub(plan: FaultPlan) -> StubTransport {
        StubTransport::instant(
            Arc::new(MemoryStore::new()),
            Arc::new(FaultInjector::new(plan)),
        )
    }

    #[tokio::test]
    async fn scripted_failure_then_success() {
        let transport = stub(FaultPlan::Script(vec![true, false]));

        let err = transport.add("first try").await.unwrap_err();
        assert!(err.to_string().contains("injected server error"));

        let items = transport.add("second try").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "second try");
    }

    #[tokio::test]
    async fn failed_mutation_never_reaches_the_store() {
        let transport = stub(FaultPlan::Always);

        assert!(transport.add("doomed").await.is_err());
        assert!(transport.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_is_immune_to_injected_failure() {
        let transport = stub(FaultPlan::Always);
        assert!(transport.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn mutations_return_the_full_snapshot() {
        let transport = stub(FaultPlan::Never);

        transport.add("first item").await.unwrap();
        let items = transport.add("second item").await.unwrap();
        assert_eq!(items.len(), 2);

        let items = transport.toggle(items[0].id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].completed);
    }
}
