//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use convo_providers::GenerateError;

/// Errors surfaced by the HTTP handlers
///
/// Unknown sessions are not errors; they come back as empty results.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Reply generation failed: {0}")]
    Generation(#[from] GenerateError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message shown to API clients; generator details stay in the logs
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            ApiError::Generation(_) => {
                "AI service is temporarily unavailable. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Generation failures are already logged with their session by the chat service.
        if let ApiError::Validation(_) = &self {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = serde_json::json!({
            "error": self.public_message(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_while(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = ApiError::Validation("Message cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_generation_maps_to_service_unavailable() {
        let err: ApiError = GenerateError::Timeout(60).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.public_message().contains("60"));
    }

    #[test]
    fn test_rejected_request_is_logged() {
        let logs = logs_while(|| {
            ApiError::Validation("Session ID too long".to_string()).into_response();
        });
        assert!(logs.contains("Rejected request: Session ID too long"));
    }

    #[test]
    fn test_generation_failure_is_not_logged_again() {
        let logs = logs_while(|| {
            let err: ApiError = GenerateError::Timeout(60).into();
            assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        });
        assert!(logs.is_empty(), "unexpected log output: {}", logs);
    }
}
