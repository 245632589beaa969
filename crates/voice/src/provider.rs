//! Speech provider abstraction and the payload sent upstream.

use {
    async_trait::async_trait,
    bytes::Bytes,
    futures::stream::BoxStream,
    serde::Serialize,
};

use crate::error::Result;

/// Byte chunks in arrival order. An `Err` item ends the stream.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Prefix of the model identifier sent to the provider.
pub const MODEL_PREFIX: &str = "tts-1";

/// Request body sent to the provider.
///
/// Serializes to `{model, input, voice, speed, pitch, stream}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPayload {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub speed: f32,
    pub pitch: f32,
    pub stream: bool,
}

impl ProviderPayload {
    /// Build a streaming payload.
    ///
    /// `voice_key` is the caller's key (it names the model), `voice` the
    /// resolved provider voice name.
    #[must_use]
    pub fn new(voice_key: &str, input: String, voice: String, speed: f32, pitch: f32) -> Self {
        Self {
            model: format!("{MODEL_PREFIX}-{voice_key}"),
            input,
            voice,
            speed,
            pitch,
            stream: true,
        }
    }
}

/// A successful provider response whose body has not been read yet.
pub struct ProviderResponse {
    /// `Content-Type` declared by the provider, if any.
    pub content_type: Option<String>,
    pub body: ChunkStream,
}

impl std::fmt::Debug for ProviderResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResponse")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A remote text-to-speech service.
///
/// Implementations make exactly one upstream attempt per call. Non-success
/// statuses are reported as [`crate::RelayError::Upstream`], connection
/// problems as [`crate::RelayError::Transport`].
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider identifier used in logs.
    fn id(&self) -> &'static str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Send `payload` and return the response body as a stream.
    async fn stream(&self, payload: &ProviderPayload) -> Result<ProviderResponse>;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_is_derived_from_voice_key() {
        let payload = ProviderPayload::new(
            "nova",
            "hello".into(),
            "zh-CN-YunxiNeural".into(),
            1.0,
            1.0,
        );
        assert_eq!(payload.model, "tts-1-nova");
        assert_eq!(payload.voice, "zh-CN-YunxiNeural");
        assert!(payload.stream);
    }

    #[test]
    fn payload_serialization() {
        let payload = ProviderPayload::new("alloy", "Hi".into(), "zh-CN-YunyangNeural".into(), 1.5, 0.5);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "tts-1-alloy",
                "input": "Hi",
                "voice": "zh-CN-YunyangNeural",
                "speed": 1.5,
                "pitch": 0.5,
                "stream": true,
            })
        );
    }
}
