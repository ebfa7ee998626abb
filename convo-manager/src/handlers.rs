use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use convo_core::config::ServerConfig;

use crate::error::ApiError;
use crate::state::{
    AppState, ChatRequest, ChatResponse, ClearResponse, ConversationResponse, HealthResponse,
    SessionsResponse,
};

/// A chat request that passed validation
#[derive(Debug, PartialEq, Eq)]
pub struct ValidChat {
    pub message: String,
    pub session_id: String,
}

/// Check a chat request against the configured limits
///
/// The message is trimmed; a blank or missing session id falls back to the
/// configured default.
pub fn validate_chat_request(
    request: ChatRequest,
    limits: &ServerConfig,
) -> Result<ValidChat, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message cannot be empty".to_string()));
    }
    if message.chars().count() > limits.max_message_length {
        return Err(ApiError::Validation(format!(
            "Message too long. Maximum length is {} characters",
            limits.max_message_length
        )));
    }

    let session_id = match request.session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => limits.default_session_id.clone(),
    };
    if session_id.chars().count() > limits.max_session_id_length {
        return Err(ApiError::Validation("Session ID too long".to_string()));
    }

    Ok(ValidChat {
        message: message.to_string(),
        session_id,
    })
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.service.store().stats();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generator: state.service.generator_name().to_string(),
        sessions: stats.sessions,
        messages: stats.messages,
    })
}

pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Invalid chat body: {}", rejection);
        ApiError::Validation("Request must be JSON".to_string())
    })?;
    let chat = validate_chat_request(request, &state.server)?;

    let reply = state.service.chat(&chat.session_id, &chat.message).await?;

    Ok(Json(ChatResponse {
        message: reply.content,
        session_id: chat.session_id,
        timestamp: reply.created_at.to_rfc3339(),
    }))
}

pub async fn get_conversation_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ConversationResponse> {
    let messages = state.service.store().history(&session_id);
    Json(ConversationResponse {
        message_count: messages.len(),
        session_id,
        messages,
    })
}

pub async fn clear_conversation_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ClearResponse> {
    state.service.store().clear_session(&session_id);
    Json(ClearResponse {
        message: format!("Conversation {} cleared successfully", session_id),
        session_id,
    })
}

pub async fn list_sessions_handler(State(state): State<AppState>) -> Json<SessionsResponse> {
    let mut sessions = state.service.store().list_active_sessions();
    sessions.sort();
    Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

pub async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}
