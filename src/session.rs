//! The action dispatcher. Wires together the reducer, a [`Transport`], and
//! the authoritative list.
//!
//! Each mutation runs the same sequence: validate, capture an undo record,
//! apply the optimistic action to the view, then let the transport settle
//! it. A confirmed settlement replaces the view with the server's snapshot;
//! a rejected one restores the captured prior state of the target item,
//! located by stable id. Every dispatched mutation reaches exactly one of
//! those two ends.
//!
//! Mutations may overlap. There is no per-item locking and no request
//! sequencing: when two in-flight mutations race, the later settlement
//! wins. Locks on the view are never held across an await.

use std::sync::Mutex;

use anyhow::Result;

use crate::events::{Event, SettlementBus};
use crate::item::{Action, Item, ViewItem, placeholder_id, validate_text};
use crate::reducer;
use crate::transport::Transport;

/// How a dispatched mutation ended. Outcomes are information, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server confirmed; the view now matches the snapshot it returned.
    Confirmed,
    /// The server rejected; the view was restored to its pre-action shape.
    RolledBack { error: String },
    /// Bad input; nothing was applied and the transport was never called.
    Rejected { error: String },
}

/// Mutation counters for the end-of-session summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub confirmed: u64,
    pub rolled_back: u64,
    pub rejected: u64,
}

impl SessionStats {
    /// Mutations that reached the transport and settled either way.
    pub fn settled(&self) -> u64 {
        self.confirmed + self.rolled_back
    }
}

/// What rollback needs to undo one optimistic action. Targets are keyed by
/// stable id; the index on `Reinsert` is only an insertion hint.
enum Undo {
    Remove { id: i64 },
    Restore { prior: Item },
    Reinsert { prior: Item, index: usize },
    /// The action named an absent id, so the optimistic apply was a no-op.
    Nothing,
}

fn capture_undo(view: &[ViewItem], action: &Action) -> Undo {
    match action {
        Action::Add { item } => Undo::Remove { id: item.id },
        Action::Toggle { id } | Action::Update { id, .. } => {
            match view.iter().find(|v| v.item.id == *id) {
                Some(v) => Undo::Restore {
                    prior: v.item.clone(),
                },
                None => Undo::Nothing,
            }
        }
        Action::Delete { id } => match view.iter().position(|v| v.item.id == *id) {
            Some(index) => Undo::Reinsert {
                prior: view[index].item.clone(),
                index,
            },
            None => Undo::Nothing,
        },
    }
}

/// One user's optimistic view of the list, backed by a transport.
pub struct Session {
    transport: Box<dyn Transport>,
    /// Last state the server confirmed. Optimistic actions never touch it.
    authoritative: Mutex<Vec<Item>>,
    view: Mutex<Vec<ViewItem>>,
    stats: Mutex<SessionStats>,
    events: SettlementBus,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            authoritative: Mutex::new(Vec::new()),
            view: Mutex::new(Vec::new()),
            stats: Mutex::new(SessionStats::default()),
            events: SettlementBus::new(),
        }
    }

    /// Current view, pending markers included.
    pub fn view(&self) -> Vec<ViewItem> {
        self.view.lock().unwrap().clone()
    }

    /// Last server-confirmed snapshot.
    pub fn authoritative(&self) -> Vec<Item> {
        self.authoritative.lock().unwrap().clone()
    }

    pub fn stats(&self) -> SessionStats {
        *self.stats.lock().unwrap()
    }

    pub fn has_pending(&self) -> bool {
        self.view.lock().unwrap().iter().any(|v| v.pending)
    }

    /// Watch settlement events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.events.watch()
    }

    /// Pull the authoritative list and rebuild the view from it.
    pub async fn refresh(&self) -> Result<Vec<ViewItem>> {
        let items = self.transport.fetch().await?;
        self.accept(items);
        Ok(self.view())
    }

    pub async fn add(&self, text: &str) -> Outcome {
        let text = match validate_text(text) {
            Ok(text) => text,
            Err(error) => return self.reject(error),
        };
        let item = Item::new(placeholder_id(), text);
        self.dispatch(Action::Add { item }).await
    }

    pub async fn toggle(&self, id: i64) -> Outcome {
        self.dispatch(Action::Toggle { id }).await
    }

    pub async fn update(&self, id: i64, text: &str) -> Outcome {
        let text = match validate_text(text) {
            Ok(text) => text,
            Err(error) => return self.reject(error),
        };
        self.dispatch(Action::Update { id, text }).await
    }

    pub async fn delete(&self, id: i64) -> Outcome {
        self.dispatch(Action::Delete { id }).await
    }

    /// Optimistic apply, remote call, one terminal settlement.
    async fn dispatch(&self, action: Action) -> Outcome {
        // The optimistic update lands before the remote call is issued.
        let undo = {
            let mut view = self.view.lock().unwrap();
            let undo = capture_undo(&view, &action);
            *view = reducer::apply(&view, &action);
            undo
        };

        let result = match &action {
            Action::Add { item } => self.transport.add(&item.text).await,
            Action::Toggle { id } => self.transport.toggle(*id).await,
            Action::Update { id, text } => self.transport.update(*id, text).await,
            Action::Delete { id } => self.transport.delete(*id).await,
        };

        match result {
            Ok(items) => {
                self.accept(items);
                self.stats.lock().unwrap().confirmed += 1;
                self.events.publish(Event::Confirmed {
                    action: action.describe(),
                });
                Outcome::Confirmed
            }
            Err(e) => {
                let error = e.to_string();
                self.rollback(undo);
                self.stats.lock().unwrap().rolled_back += 1;
                self.events.publish(Event::RolledBack {
                    action: action.describe(),
                    error: error.clone(),
                });
                Outcome::RolledBack { error }
            }
        }
    }

    /// A confirmed snapshot replaces both the authoritative list and the
    /// view. Any optimistic entry from a still-racing mutation is replaced
    /// too; its own settlement will have the last word.
    fn accept(&self, items: Vec<Item>) {
        let mut authoritative = self.authoritative.lock().unwrap();
        let mut view = self.view.lock().unwrap();
        *view = items.iter().cloned().map(ViewItem::confirmed).collect();
        *authoritative = items;
    }

    /// Restore the captured prior state of the target, located by id. The
    /// opposite action is never re-applied.
    fn rollback(&self, undo: Undo) {
        let mut view = self.view.lock().unwrap();
        match undo {
            Undo::Remove { id } => view.retain(|v| v.item.id != id),
            Undo::Restore { prior } => {
                if let Some(v) = view.iter_mut().find(|v| v.item.id == prior.id) {
                    *v = ViewItem::confirmed(prior);
                }
            }
            Undo::Reinsert { prior, index } => {
                if view.iter().any(|v| v.item.id == prior.id) {
                    return;
                }
                let at = index.min(view.len());
                view.insert(at, ViewItem::confirmed(prior));
            }
            Undo::Nothing => {}
        }
    }

    fn reject(&self, error: String) -> Outcome {
        self.stats.lock().unwrap().rejected += 1;
        Outcome::Rejected { error }
    }
}
