//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use convo_core::config::GeneratorConfig;
use convo_core::session::ContextEntry;
use convo_core::utils::truncate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::base::{
    build_messages, GenerateError, GenerateResult, Message, ReplyGenerator, FALLBACK_REPLY,
};

/// Chat completion request format
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

/// Chat completion response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generator backed by any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompatGenerator {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    timeout_secs: u64,
}

impl OpenAiCompatGenerator {
    pub fn new(config: &GeneratorConfig) -> GenerateResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerateError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        let api_key = if config.api_key.trim().is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };

        info!(
            "Reply generator initialized with model {} at {}",
            config.model, config.api_base
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            timeout_secs: config.timeout_secs,
        })
    }

    fn parse_response(response: ChatCompletionResponse) -> GenerateResult<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerateError::InvalidResponse("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            warn!("Empty response from model");
            return Ok(FALLBACK_REPLY.to_string());
        }
        Ok(content.to_string())
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerateError {
        if err.is_timeout() {
            GenerateError::Timeout(self.timeout_secs)
        } else {
            GenerateError::HttpError(err)
        }
    }
}

#[async_trait]
impl ReplyGenerator for OpenAiCompatGenerator {
    async fn generate_reply(&self, prompt: &str, context: &[ContextEntry]) -> GenerateResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(prompt, context),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        };

        debug!(
            "Sending chat request to {} with {} messages",
            self.api_base,
            request.messages.len()
        );

        let url = format!("{}/chat/completions", self.api_base);
        let mut req_builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerateError::ApiError(format!(
                "HTTP {}: {}",
                status,
                truncate(&error_text, 500)
            )));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let reply = Self::parse_response(parsed)?;
        debug!("Generated reply: {}", truncate(&reply, 100));
        Ok(reply)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
