//! Per-request speech relay: clean, build payload, call provider, stream back.

use std::sync::Arc;

use {
    futures::StreamExt,
    tracing::{debug, info, warn},
    voxrelay_cleaner::clean,
};

use crate::{
    config::RelayConfig,
    error::{EMPTY_TEXT_MESSAGE, RelayError, Result},
    provider::{ChunkStream, ProviderPayload, SpeechProvider},
    request::SpeechRequest,
    voices::VoiceMap,
};

/// Audio relayed to the caller.
pub struct AudioStream {
    /// Provider content type, or the configured default.
    pub content_type: String,
    /// Chunks of at most `chunk_size` bytes, in provider order.
    pub chunks: ChunkStream,
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Turns [`SpeechRequest`]s into relayed provider audio.
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Clone)]
pub struct SpeechRelay {
    provider: Arc<dyn SpeechProvider>,
    voices: Arc<VoiceMap>,
    config: RelayConfig,
}

impl std::fmt::Debug for SpeechRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechRelay")
            .field("provider", &self.provider.id())
            .field("voices", &self.voices.len())
            .field("config", &self.config)
            .finish()
    }
}

impl SpeechRelay {
    #[must_use]
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        voices: Arc<VoiceMap>,
        config: RelayConfig,
    ) -> Self {
        Self {
            provider,
            voices,
            config,
        }
    }

    #[must_use]
    pub fn voices(&self) -> &VoiceMap {
        &self.voices
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Validate and clean `request` and build the provider payload.
    ///
    /// Never touches the network.
    pub fn prepare(&self, request: SpeechRequest) -> Result<ProviderPayload> {
        let strict = self.config.strict_parameters;
        let speed = request.speed.resolve("speed", strict)?;
        let pitch = request.pitch.resolve("pitch", strict)?;

        debug!(
            raw_len = request.input.chars().count(),
            cleaning = !request.cleaning_options.is_empty(),
            "cleaning speech input"
        );
        let text = clean(&request.input, &request.cleaning_options);
        if text.is_empty() {
            return Err(RelayError::validation(EMPTY_TEXT_MESSAGE));
        }
        if let Some(max) = self.config.max_text_length {
            let len = text.chars().count();
            if len > max {
                return Err(RelayError::validation(format!(
                    "cleaned text is too long ({len} characters, max {max})"
                )));
            }
        }

        let voice_key = request
            .voice
            .unwrap_or_else(|| self.config.default_voice.clone());
        let voice = self.voices.resolve(&voice_key).to_owned();
        Ok(ProviderPayload::new(&voice_key, text, voice, speed, pitch))
    }

    /// Handle one request end to end.
    ///
    /// Validation failures return before the provider is called. On success
    /// the returned stream pulls from the provider lazily; dropping it drops
    /// the upstream response.
    pub async fn handle(&self, request: SpeechRequest) -> Result<AudioStream> {
        let payload = self.prepare(request).inspect_err(|e| {
            debug!(error = %e, "rejected speech request");
        })?;

        info!(
            provider = self.provider.id(),
            model = %payload.model,
            voice = %payload.voice,
            text_len = payload.input.chars().count(),
            "dispatching speech request"
        );

        let response = self.provider.stream(&payload).await.inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "provider call failed");
        })?;

        let content_type = response
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| self.config.default_content_type.clone());

        Ok(AudioStream {
            content_type,
            chunks: bounded_chunks(response.body, self.config.chunk_size),
        })
    }
}

/// Re-yield `body` with every chunk split to at most `chunk_size` bytes.
///
/// Chunks are split, never merged, so arrival order and boundaries below the
/// limit are preserved. Empty chunks are skipped. The first error ends the
/// stream.
pub fn bounded_chunks(body: ChunkStream, chunk_size: usize) -> ChunkStream {
    let chunk_size = chunk_size.max(1);
    async_stream::stream! {
        let mut body = body;
        let mut chunks = 0usize;
        let mut bytes = 0usize;
        while let Some(item) = body.next().await {
            match item {
                Ok(mut chunk) => {
                    while !chunk.is_empty() {
                        let piece = chunk.split_to(chunk.len().min(chunk_size));
                        chunks += 1;
                        bytes += piece.len();
                        yield Ok(piece);
                    }
                },
                Err(e) => {
                    warn!(chunks, bytes, error = %e, "provider stream failed mid-relay");
                    yield Err(e);
                    return;
                },
            }
        }
        debug!(chunks, bytes, "relay completed");
    }
    .boxed()
}
