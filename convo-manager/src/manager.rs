use std::sync::Arc;

use convo_core::session::{Message, Role, SessionStore};
use convo_core::utils::truncate;
use convo_providers::{GenerateResult, ReplyGenerator};
use tracing::{error, info};

/// Runs one chat exchange against the session store and a reply generator
///
/// The user message is recorded before generation starts and stays recorded
/// if generation fails. No store lock is held while the generator runs.
pub struct ChatService {
    store: Arc<SessionStore>,
    generator: Arc<dyn ReplyGenerator>,
}

impl ChatService {
    pub fn new(store: Arc<SessionStore>, generator: Arc<dyn ReplyGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Record `message`, generate a reply from the context window, record the reply
    ///
    /// Returns the stored assistant message.
    pub async fn chat(&self, session_id: &str, message: &str) -> GenerateResult<Message> {
        info!(
            "Received message for session {}: {}",
            session_id,
            truncate(message, 100)
        );
        self.store.add_message(session_id, Role::User, message);

        let context = self.store.context(session_id, self.store.context_window());

        let reply = match self.generator.generate_reply(message, &context).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Reply generation failed for session {}: {}", session_id, e);
                return Err(e);
            }
        };

        let recorded = self.store.add_message(session_id, Role::Assistant, reply);
        info!(
            "Generated response for session {}: {}",
            session_id,
            truncate(&recorded.content, 100)
        );
        Ok(recorded)
    }
}
