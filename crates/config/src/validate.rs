//! Configuration validation.
//!
//! Checks a loaded [`VoxrelayConfig`] for values that would make the relay
//! fail at runtime (bad provider URL, zero chunk size) and for likely
//! mistakes (missing API key, unresolved `${...}` placeholders).

use {secrecy::ExposeSecret, url::Url};

use crate::{env_subst::has_placeholder, schema::VoxrelayConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "provider.base_url"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
#[must_use]
pub fn validate(config: &VoxrelayConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    match Url::parse(&config.provider.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {},
        Ok(url) => result.push(
            Severity::Error,
            "provider.base_url",
            format!("unsupported scheme `{}`, expected http or https", url.scheme()),
        ),
        Err(e) => result.push(
            Severity::Error,
            "provider.base_url",
            format!("invalid URL: {e}"),
        ),
    }

    match config.provider.api_key.as_ref() {
        None => result.push(
            Severity::Warning,
            "provider.api_key",
            "no API key configured; requests are sent without Authorization",
        ),
        Some(key) if has_placeholder(key.expose_secret()) => result.push(
            Severity::Warning,
            "provider.api_key",
            "contains an unresolved ${...} placeholder",
        ),
        Some(_) => {},
    }

    if config.provider.timeout_secs == 0 {
        result.push(Severity::Error, "provider.timeout_secs", "must be greater than 0");
    }
    if config.provider.connect_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "provider.connect_timeout_secs",
            "must be greater than 0",
        );
    }

    if config.relay.chunk_size == 0 {
        result.push(Severity::Error, "relay.chunk_size", "must be greater than 0");
    }
    if config.relay.default_content_type.trim().is_empty() {
        result.push(Severity::Error, "relay.default_content_type", "must not be empty");
    }
    if config.relay.default_voice.trim().is_empty() {
        result.push(Severity::Error, "relay.default_voice", "must not be empty");
    }
    if config.relay.max_text_length == Some(0) {
        result.push(
            Severity::Error,
            "relay.max_text_length",
            "must be greater than 0 when set",
        );
    }

    for (key, voice) in &config.voices {
        if key.trim().is_empty() {
            result.push(Severity::Error, "voices", "voice key must not be empty");
        } else if voice.trim().is_empty() {
            result.push(
                Severity::Error,
                format!("voices.{key}"),
                "provider voice name must not be empty",
            );
        }
    }

    if config.server.bind != "127.0.0.1" && config.server.bind != "localhost" {
        result.push(
            Severity::Info,
            "server.bind",
            format!(
                "listening on {} exposes the relay (and your provider quota) beyond this host",
                config.server.bind
            ),
        );
    }

    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    fn configured() -> VoxrelayConfig {
        let mut config = VoxrelayConfig::default();
        config.provider.api_key = Some(Secret::new("sk-test".into()));
        config
    }

    #[test]
    fn configured_defaults_are_clean() {
        let result = validate(&configured());
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn missing_api_key_warns() {
        let result = validate(&VoxrelayConfig::default());
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(result.diagnostics[0].path, "provider.api_key");
    }

    #[test]
    fn unresolved_placeholder_warns() {
        let mut config = configured();
        config.provider.api_key = Some(Secret::new("${VOXRELAY_API_KEY}".into()));
        let result = validate(&config);
        assert_eq!(result.count(Severity::Warning), 1);
        assert!(result.diagnostics[0].message.contains("placeholder"));
    }

    #[test]
    fn bad_url_and_scheme_are_errors() {
        let mut config = configured();
        config.provider.base_url = "not a url".into();
        assert!(validate(&config).has_errors());

        config.provider.base_url = "ftp://example.com/speech".into();
        let result = validate(&config);
        assert!(result.has_errors());
        assert!(result.diagnostics[0].message.contains("ftp"));
    }

    #[test]
    fn zero_sizes_are_errors() {
        let mut config = configured();
        config.relay.chunk_size = 0;
        config.provider.timeout_secs = 0;
        config.relay.max_text_length = Some(0);
        let result = validate(&config);
        assert_eq!(result.count(Severity::Error), 3);
    }

    #[test]
    fn empty_voice_entries_are_errors() {
        let mut config = configured();
        config.voices.insert("narrator".into(), " ".into());
        config.voices.insert(String::new(), "x".into());
        let result = validate(&config);
        assert_eq!(result.count(Severity::Error), 2);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "voices.narrator")
        );
    }

    #[test]
    fn public_bind_is_informational() {
        let mut config = configured();
        config.server.bind = "0.0.0.0".into();
        let result = validate(&config);
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Info), 1);
        assert_eq!(
            result.diagnostics[0].to_string(),
            "info: server.bind: listening on 0.0.0.0 exposes the relay (and your provider quota) beyond this host"
        );
    }
}
