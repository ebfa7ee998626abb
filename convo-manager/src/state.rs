use convo_core::config::ServerConfig;
use convo_core::session::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::manager::ChatService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, server: ServerConfig) -> Self {
        Self {
            service,
            server: Arc::new(server),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub generator: String,
    pub sessions: usize,
    pub messages: usize,
}
