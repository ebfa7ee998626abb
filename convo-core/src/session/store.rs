//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::ContextEntry;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message
///
/// Messages are never edited after creation; the store hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role (user, assistant)
    pub role: Role,
    /// Message content
    pub content: String,
    /// Creation time
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
        }
    }

    /// Role and content only, as sent to a reply generator
    pub fn to_context_entry(&self) -> ContextEntry {
        ContextEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A conversation session
#[derive(Debug, Clone)]
pub struct Session {
    /// Session key
    pub key: String,
    /// Messages in the session, oldest first
    pub messages: Vec<Message>,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new(key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            messages: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Append a message and trim the oldest ones down to `max_history`
    ///
    /// Returns how many messages were evicted.
    pub fn push(&mut self, message: Message, max_history: usize) -> usize {
        self.last_active_at = message.created_at;
        self.messages.push(message);

        let excess = self.messages.len().saturating_sub(max_history);
        if excess > 0 {
            self.messages.drain(..excess);
        }
        excess
    }

    /// Time since the session was created, zero if the clock went backwards
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }

    /// Whether the session has been idle for longer than `timeout` at `now`
    ///
    /// A clock that went backwards never expires a session.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: std::time::Duration) -> bool {
        match (now - self.last_active_at).to_std() {
            Ok(idle) => idle > timeout,
            Err(_) => false,
        }
    }
}
