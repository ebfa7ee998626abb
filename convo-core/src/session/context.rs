//! Context projection: the slice of history a reply generator sees

use serde::{Deserialize, Serialize};

use super::store::{Message, Role};

/// A timestamp-free history entry handed to a reply generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Project the last `window_size` messages of `history`, oldest first
///
/// Takes `min(window_size, history.len())` entries, so the result is always
/// a suffix of `history` with the timestamps dropped.
pub fn project(history: &[Message], window_size: usize) -> Vec<ContextEntry> {
    let start = history.len().saturating_sub(window_size);
    history[start..]
        .iter()
        .map(Message::to_context_entry)
        .collect()
}
