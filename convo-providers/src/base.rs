//! Base trait for reply generators

use async_trait::async_trait;
use convo_core::session::{ContextEntry, Role};
use serde::Serialize;
use thiserror::Error;

/// Error type for generator operations
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

/// Reply used when a generator answers with nothing
pub const FALLBACK_REPLY: &str =
    "I apologize, but I couldn't generate a response at the moment. Please try again.";

/// A message in the chat completion wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User.as_str(),
            content: content.into(),
        }
    }
}

impl From<&ContextEntry> for Message {
    fn from(entry: &ContextEntry) -> Self {
        Self {
            role: entry.role.as_str(),
            content: entry.content.clone(),
        }
    }
}

/// Build the message list for a generation call
///
/// The prompt becomes the final user turn. Callers usually record the prompt
/// before fetching context, in which case the context already ends with it
/// and it is not repeated.
pub fn build_messages(prompt: &str, context: &[ContextEntry]) -> Vec<Message> {
    let mut messages: Vec<Message> = context.iter().map(Message::from).collect();
    let ends_with_prompt = context
        .last()
        .is_some_and(|last| last.role == Role::User && last.content == prompt);
    if !ends_with_prompt {
        messages.push(Message::user(prompt));
    }
    messages
}

/// Produces an assistant reply for a prompt and its conversation context
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply to `prompt` given the recent `context`, oldest first
    async fn generate_reply(&self, prompt: &str, context: &[ContextEntry]) -> GenerateResult<String>;

    /// Short name used in logs and health output
    fn name(&self) -> &str;
}
