//! JSON bodies shared by the served API and the HTTP client.
//!
//! Every successful mutation answers with [`Snapshot`] — the full list is
//! the new authoritative state. Failures answer with [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::item::Item;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBody {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdBody {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditBody {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
