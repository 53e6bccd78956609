//! Settlement notifications, decoupled from whoever dispatched.
//!
//! The dispatcher publishes every terminal settlement; renderers (the demo
//! printer, a future UI) watch the feed without holding up dispatch. Built
//! on [`tokio::sync::broadcast`] so any number of watchers can lag or drop
//! out independently.

use tokio::sync::broadcast;

/// Watchers that fall this far behind start losing the oldest settlements.
const BACKLOG: usize = 32;

/// How a mutation settled.
#[derive(Debug, Clone)]
pub enum Event {
    /// The server confirmed the mutation (carries its short description).
    Confirmed { action: String },
    /// The server rejected the mutation and the view was rolled back.
    RolledBack { action: String, error: String },
}

/// The feed the dispatcher reports settlements on.
#[derive(Debug)]
pub struct SettlementBus {
    tx: broadcast::Sender<Event>,
}

impl SettlementBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BACKLOG);
        Self { tx }
    }

    /// Publish a settlement to every current watcher. Returns how many will
    /// see it; with nobody watching, the event is simply dropped.
    pub fn publish(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Watch future settlements. Past ones are not replayed.
    pub fn watch(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for SettlementBus {
    fn default() -> Self {
        Self::new()
    }
}
