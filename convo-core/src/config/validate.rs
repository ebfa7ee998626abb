//! Configuration validation rules.

use super::schema::{Config, GeneratorKind};

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let sessions = &config.sessions;
    if sessions.max_history == 0 {
        errors.push("sessions.max_history must be > 0".to_string());
    }
    if sessions.context_window == 0 {
        errors.push("sessions.context_window must be > 0".to_string());
    }
    if sessions.session_timeout_secs == 0 {
        errors.push("sessions.session_timeout_secs must be > 0".to_string());
    }

    let server = &config.server;
    if server.max_message_length == 0 {
        errors.push("server.max_message_length must be > 0".to_string());
    }
    if server.max_session_id_length == 0 {
        errors.push("server.max_session_id_length must be > 0".to_string());
    }
    if server.default_session_id.trim().is_empty() {
        errors.push("server.default_session_id must not be empty".to_string());
    }

    let generator = &config.generator;
    if !(0.0..=2.0).contains(&generator.temperature) {
        errors.push("generator.temperature must be in [0.0, 2.0]".to_string());
    }
    if !(generator.top_p > 0.0 && generator.top_p <= 1.0) {
        errors.push("generator.top_p must be in (0.0, 1.0]".to_string());
    }
    if generator.max_tokens == 0 {
        errors.push("generator.max_tokens must be > 0".to_string());
    }
    if generator.provider == GeneratorKind::Openai && generator.api_base.trim().is_empty() {
        errors.push("generator.api_base is required when provider is openai".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

/// Settings that are accepted but probably not what the operator meant.
///
/// Returned rather than logged so callers can report them once logging is up.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    let sessions = &config.sessions;
    if sessions.context_window > sessions.max_history && sessions.max_history > 0 {
        warnings.push(format!(
            "sessions.context_window ({}) exceeds sessions.max_history ({}); context is capped by stored history",
            sessions.context_window, sessions.max_history
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_allows_window_larger_than_history() {
        let mut config = Config::default();
        config.sessions.max_history = 3;
        config.sessions.context_window = 10;
        validate_config(&config).unwrap();

        let warnings = config_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("sessions.context_window (10)"));
        assert!(warnings[0].contains("sessions.max_history (3)"));
    }

    #[test]
    fn test_no_warnings_for_defaults() {
        assert!(config_warnings(&Config::default()).is_empty());
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.sessions.context_window = 0;
        config.generator.top_p = 0.0;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("sessions.context_window"));
        assert!(err.contains("generator.top_p"));
    }

    #[test]
    fn test_validate_openai_requires_api_base() {
        let mut config = Config::default();
        config.generator.api_base = "  ".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("generator.api_base"));

        config.generator.provider = GeneratorKind::Echo;
        validate_config(&config).unwrap();
    }
}
