//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".convo"))
            .unwrap_or_else(|| PathBuf::from(".convo"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    ///
    /// Precedence, lowest first: built-in defaults, `config.json`, alias
    /// variables such as `MAX_CONVERSATION_HISTORY`, then `CONVO__` path
    /// variables.
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content).map_err(|e| {
                crate::Error::Config(format!("invalid {}: {}", config_path.display(), e))
            })?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)
            .map_err(|e| crate::Error::Config(format!("invalid configuration value: {}", e)))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the JSON config file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(raw: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return v;
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Number(v.into());
    }
    if let Ok(v) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(v) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

/// How an alias variable's raw text becomes a JSON value
#[derive(Clone, Copy)]
enum AliasValue {
    Number,
    Text,
}

fn apply_alias_overrides(config: &mut Value) {
    let aliases = [
        ("MAX_CONVERSATION_HISTORY", "sessions.max_history", AliasValue::Number),
        ("CONVERSATION_TIMEOUT", "sessions.session_timeout_secs", AliasValue::Number),
        ("CONTEXT_WINDOW", "sessions.context_window", AliasValue::Number),
        ("MAX_MESSAGE_LENGTH", "server.max_message_length", AliasValue::Number),
        ("OPENAI_API_KEY", "generator.api_key", AliasValue::Text),
        ("GENERATOR_API_KEY", "generator.api_key", AliasValue::Text),
        ("GENERATOR_MODEL", "generator.model", AliasValue::Text),
    ];

    for (env_key, target_path, kind) in aliases {
        if let Ok(raw) = std::env::var(env_key) {
            let value = match kind {
                AliasValue::Number => parse_env_value(raw.trim()),
                AliasValue::Text => Value::String(raw),
            };
            let path: Vec<String> = target_path.split('.').map(ToString::to_string).collect();
            set_path_value(config, &path, value);
        }
    }
}

fn apply_path_overrides(config: &mut Value) {
    const PREFIX: &str = "CONVO__";
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        set_path_value(config, &segments, parse_env_value(&value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorKind;
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            // SAFETY: tests serialize env mutations with ENV_LOCK.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.original {
                // SAFETY: tests serialize env mutations with ENV_LOCK.
                unsafe { std::env::set_var(&self.key, value) };
            } else {
                // SAFETY: tests serialize env mutations with ENV_LOCK.
                unsafe { std::env::remove_var(&self.key) };
            }
        }
    }

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_load_default_config() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.sessions.max_history, 20);
        assert_eq!(config.sessions.session_timeout_secs, 3600);
        assert_eq!(config.sessions.context_window, 10);
    }

    #[test]
    fn test_save_and_load_config() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        let mut config = Config::default();
        config.sessions.max_history = 7;
        config.generator.provider = GeneratorKind::Echo;

        loader.save(&config).unwrap();
        let loaded = loader.load().unwrap();

        assert_eq!(loaded.sessions.max_history, 7);
        assert_eq!(loaded.generator.provider, GeneratorKind::Echo);
    }

    #[test]
    fn test_load_applies_alias_env_overrides() {
        let _lock = lock_env();
        let _history_guard = EnvVarGuard::set("MAX_CONVERSATION_HISTORY", "30");
        let _timeout_guard = EnvVarGuard::set("CONVERSATION_TIMEOUT", "120");
        let _key_guard = EnvVarGuard::set("GENERATOR_API_KEY", "12345");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.sessions.max_history, 30);
        assert_eq!(config.sessions.session_timeout_secs, 120);
        assert_eq!(config.generator.api_key, "12345");
    }

    #[test]
    fn test_load_applies_path_env_overrides() {
        let _lock = lock_env();
        let _window_guard = EnvVarGuard::set("CONVO__SESSIONS__CONTEXT_WINDOW", "4");
        let _port_guard = EnvVarGuard::set("CONVO__SERVER__PORT", "8080");
        let _temp_guard = EnvVarGuard::set("CONVO__GENERATOR__TEMPERATURE", "0.2");
        let _provider_guard = EnvVarGuard::set("CONVO__GENERATOR__PROVIDER", "echo");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.sessions.context_window, 4);
        assert_eq!(config.server.port, 8080);
        assert!((config.generator.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.generator.provider, GeneratorKind::Echo);
    }

    #[test]
    fn test_path_env_overrides_alias_and_file() {
        let _lock = lock_env();
        let _alias_guard = EnvVarGuard::set("MAX_CONVERSATION_HISTORY", "40");
        let _path_guard = EnvVarGuard::set("CONVO__SESSIONS__MAX_HISTORY", "50");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(
            loader.config_path(),
            r#"{"sessions":{"max_history":15}}"#,
        )
        .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.sessions.max_history, 50);
    }

    #[test]
    fn test_file_values_merge_over_defaults() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(
            loader.config_path(),
            r#"{"sessions":{"session_timeout_secs":90},"server":{"port":9000}}"#,
        )
        .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.sessions.session_timeout_secs, 90);
        assert_eq!(config.sessions.max_history, 20);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_message_length, 4000);
    }

    #[test]
    fn test_validation_rejects_zero_history() {
        let _lock = lock_env();
        let _guard = EnvVarGuard::set("CONVO__SESSIONS__MAX_HISTORY", "0");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let err = loader.load().unwrap_err();
        assert!(err.to_string().contains("max_history"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(loader.config_path(), "{ not json").unwrap();

        let err = loader.load().unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_mistyped_override_is_config_error() {
        let _lock = lock_env();
        let _guard = EnvVarGuard::set("CONVO__SERVER__PORT", "not-a-port");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let err = loader.load().unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_set_path_value_creates_intermediate_objects() {
        let mut root = Value::Object(Map::new());
        let path = vec!["a".to_string(), "b".to_string()];
        set_path_value(&mut root, &path, Value::Bool(true));
        assert_eq!(root, serde_json::json!({"a": {"b": true}}));
    }
}
