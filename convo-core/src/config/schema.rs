//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration for convo
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Session store configuration
    #[serde(default)]
    pub sessions: SessionConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Reply generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Messages retained per session
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Idle time after which a session is reaped
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    /// Messages handed to the reply generator
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Background sweep interval, 0 disables the sweeper
    #[serde(default)]
    pub reap_interval_secs: u64,
}

fn default_max_history() -> usize {
    20
}

fn default_session_timeout_secs() -> u64 {
    3600
}

fn default_context_window() -> usize {
    10
}

impl SessionConfig {
    /// Idle timeout as a duration
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// Sweep interval, if the background sweeper is enabled
    pub fn reap_interval(&self) -> Option<Duration> {
        if self.reap_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.reap_interval_secs))
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            session_timeout_secs: default_session_timeout_secs(),
            context_window: default_context_window(),
            reap_interval_secs: 0,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Maximum accepted message length, in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Maximum accepted session id length, in characters
    #[serde(default = "default_max_session_id_length")]
    pub max_session_id_length: usize,
    /// Session used when a chat request names none
    #[serde(default = "default_session_id")]
    pub default_session_id: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_max_message_length() -> usize {
    4000
}

fn default_max_session_id_length() -> usize {
    100
}

fn default_session_id() -> String {
    "default".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_message_length: default_max_message_length(),
            max_session_id_length: default_max_session_id_length(),
            default_session_id: default_session_id(),
        }
    }
}

/// Which reply generator backs the chat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    Openai,
    /// Offline generator that echoes the prompt
    Echo,
}

/// Reply generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub provider: GeneratorKind,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Request timeout for a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_timeout_secs() -> u64 {
    60
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorKind::default(),
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
