//! Offline generator that answers without calling a model

use async_trait::async_trait;
use convo_core::session::ContextEntry;

use crate::base::{GenerateResult, ReplyGenerator};

/// Replies by echoing the prompt back
///
/// Useful for running the server without model credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGenerator;

#[async_trait]
impl ReplyGenerator for EchoGenerator {
    async fn generate_reply(&self, prompt: &str, context: &[ContextEntry]) -> GenerateResult<String> {
        Ok(format!(
            "You said: {} ({} messages in context)",
            prompt,
            context.len()
        ))
    }

    fn name(&self) -> &str {
        "echo"
    }
}
