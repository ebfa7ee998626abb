//! Session store for handling multiple conversations

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::context::{self, ContextEntry};
use super::store::{Message, Role, Session};
use crate::config::SessionConfig;

/// Owns every conversation session in the process
///
/// All access goes through one mutex over the whole map, so mutations,
/// reaping and reads are serialized against each other. Everything handed
/// back to callers is a copy.
///
/// Idle sessions are reaped lazily: each operation first drops the sessions
/// whose last activity is older than the configured timeout, so no caller
/// ever observes an expired session.
#[derive(Debug)]
pub struct SessionStore {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    pub(super) sessions: Mutex<HashMap<String, Session>>,
}

/// Point-in-time counts over the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub messages: usize,
}

impl SessionStore {
    /// Create a store that reads the wall clock
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store with a custom time source
    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            "Session store initialized (max_history={}, timeout={}s, context_window={})",
            config.max_history, config.session_timeout_secs, config.context_window
        );
        Self {
            config,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Configured number of messages handed to a reply generator
    pub fn context_window(&self) -> usize {
        self.config.context_window
    }

    /// Record a message, creating the session on first use
    ///
    /// Content is taken as-is; callers validate it beforehand.
    pub fn add_message(&self, key: &str, role: Role, content: impl Into<String>) -> Message {
        let content = content.into();
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions);

        // Read under the lock so timestamps follow insertion order.
        let now = self.clock.now();
        let message = Message::new(role, content, now);

        let session = sessions.entry(key.to_string()).or_insert_with(|| {
            info!("Created session {}", key);
            Session::new(key, now)
        });
        let evicted = session.push(message.clone(), self.config.max_history);

        debug!(
            "Added {} message to session {} ({} stored, {} evicted)",
            role,
            key,
            session.messages.len(),
            evicted
        );
        message
    }

    /// Full stored history of a session, empty if the session does not exist
    pub fn history(&self, key: &str) -> Vec<Message> {
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions);
        sessions
            .get(key)
            .map(|session| session.messages.clone())
            .unwrap_or_default()
    }

    /// The last `window_size` messages of a session without timestamps
    pub fn context(&self, key: &str, window_size: usize) -> Vec<ContextEntry> {
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions);
        sessions
            .get(key)
            .map(|session| context::project(&session.messages, window_size))
            .unwrap_or_default()
    }

    /// Remove a session entirely
    ///
    /// Clearing an unknown session is a no-op; returns whether anything was
    /// removed.
    pub fn clear_session(&self, key: &str) -> bool {
        let removed = self.sessions.lock().remove(key).is_some();
        info!("Cleared conversation for session {}", key);
        removed
    }

    /// Keys of all sessions that have not expired, in no particular order
    pub fn list_active_sessions(&self) -> Vec<String> {
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions);
        sessions.keys().cloned().collect()
    }

    /// Drop every expired session now; returns how many were dropped
    pub fn reap_expired(&self) -> usize {
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions).len()
    }

    pub fn stats(&self) -> StoreStats {
        let mut sessions = self.sessions.lock();
        self.reap_locked(&mut sessions);
        StoreStats {
            sessions: sessions.len(),
            messages: sessions.values().map(|s| s.messages.len()).sum(),
        }
    }

    fn reap_locked(&self, sessions: &mut HashMap<String, Session>) -> Vec<String> {
        let now = self.clock.now();
        let timeout: Duration = self.config.session_timeout();

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| session.is_expired(now, timeout))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(session) = sessions.remove(key) {
                info!(
                    "Cleaned up expired session: {} (age {}s, {} messages)",
                    session.key,
                    session.age(now).as_secs(),
                    session.messages.len()
                );
            }
        }
        expired
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
