//! Config schema types (server, provider, relay, voices).

use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    voxrelay_voice::{ProviderConfig, RelayConfig, VoiceMap},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxrelayConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub relay: RelayConfig,
    /// Extra or overriding entries for the built-in voice table.
    pub voices: BTreeMap<String, String>,
}

impl VoxrelayConfig {
    /// Built-in voice table merged with `[voices]`.
    #[must_use]
    pub fn voice_map(&self) -> VoiceMap {
        VoiceMap::with_overrides(self.voices.clone())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Seconds to wait for in-flight streams on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 5000,
            shutdown_timeout_secs: 10,
        }
    }
}
