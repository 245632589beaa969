//! Speech relay for voxrelay.
//!
//! Cleans caller text, maps the caller's voice key to a provider voice name,
//! sends one streaming request to a text-to-speech provider and hands the
//! provider's audio back as a chunk stream without buffering it.

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod relay;
pub mod request;
pub mod voices;

pub use {
    config::{ProviderConfig, RelayConfig},
    error::{RelayError, Result},
    http::HttpSpeechProvider,
    provider::{ChunkStream, ProviderPayload, ProviderResponse, SpeechProvider},
    relay::{AudioStream, SpeechRelay},
    request::{NumericParam, SpeechRequest},
    voices::{VoiceEntry, VoiceMap},
};
