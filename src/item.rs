use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_TEXT_LEN;

/// A confirmed todo item. Ids come from the store and are always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

impl Item {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// An item as the view sees it: either confirmed, or an in-flight copy
/// still waiting on the server. View state only — never persisted, never
/// sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItem {
    pub item: Item,
    pub pending: bool,
}

impl ViewItem {
    pub fn confirmed(item: Item) -> Self {
        Self {
            item,
            pending: false,
        }
    }

    pub fn pending(item: Item) -> Self {
        Self {
            item,
            pending: true,
        }
    }
}

/// Placeholder id for an optimistic entry. Negative, so it can never be
/// mistaken for a store-assigned id; it dies at reconciliation.
pub fn placeholder_id() -> i64 {
    let mut rng = rand::rng();
    -(rng.random::<u32>() as i64) - 1
}

/// A mutation as the reducer consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { item: Item },
    Toggle { id: i64 },
    Update { id: i64, text: String },
    Delete { id: i64 },
}

impl Action {
    /// Short human label, used in settlement events.
    pub fn describe(&self) -> String {
        match self {
            Action::Add { item } => format!("add \"{}\"", item.text),
            Action::Toggle { id } => format!("toggle {id}"),
            Action::Update { id, .. } => format!("edit {id}"),
            Action::Delete { id } => format!("remove {id}"),
        }
    }
}

/// Check item text before anything is dispatched. Rejected input never
/// reaches the view or the wire.
pub fn validate_text(text: &str) -> Result<String, String> {
    let trimmed = text.trim();
    if trimmed.len() < MIN_TEXT_LEN {
        return Err(format!("enter at least {MIN_TEXT_LEN} characters"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_ids_are_negative() {
        for _ in 0..100 {
            assert!(placeholder_id() < 0);
        }
    }

    #[test]
    fn validate_rejects_empty_and_short() {
        assert!(validate_text("").is_err());
        assert!(validate_text("   ").is_err());
        assert!(validate_text("milk").is_err());
    }

    #[test]
    fn validate_trims_and_accepts() {
        assert_eq!(validate_text("  Buy milk  ").unwrap(), "Buy milk");
    }

    #[test]
    fn whitespace_padding_does_not_satisfy_the_minimum() {
        assert!(validate_text("a    ").is_err());
    }

    #[test]
    fn describe_names_the_mutation() {
        let action = Action::Add {
            item: Item::new(-7, "Buy milk"),
        };
        assert_eq!(action.describe(), "add \"Buy milk\"");
        assert_eq!(Action::Toggle { id: 3 }.describe(), "toggle 3");
    }
}
