//! Provider and relay configuration types.

use std::time::Duration;

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Default speech endpoint (OpenAI-compatible `audio/speech`).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Content type used when the provider does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Voice key used when the request omits `voice`.
pub const DEFAULT_VOICE: &str = "shimmer";

/// Maximum size of a relayed chunk in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Remote TTS provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Full URL of the speech endpoint.
    pub base_url: String,

    /// Bearer token sent to the provider.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Upper bound for connecting and receiving response headers.
    pub timeout_secs: u64,

    /// Upper bound for establishing the TCP/TLS connection.
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Per-request relay behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Largest chunk forwarded to the caller. Larger upstream chunks are split.
    pub chunk_size: usize,

    /// Content type used when the provider omits one.
    pub default_content_type: String,

    /// Voice key used when the request has none.
    pub default_voice: String,

    /// Reject unparsable `speed`/`pitch` instead of falling back to 1.0.
    pub strict_parameters: bool,

    /// Reject cleaned text longer than this many characters.
    pub max_text_length: Option<usize>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_content_type: DEFAULT_CONTENT_TYPE.into(),
            default_voice: DEFAULT_VOICE.into(),
            strict_parameters: false,
            max_text_length: None,
        }
    }
}

// ── Secret serialization helpers ───────────────────────────────────────────

fn serialize_option_secret<S>(
    value: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use secrecy::ExposeSecret;
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_option_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|k| !k.is_empty()).map(Secret::new))
}
