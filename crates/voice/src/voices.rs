//! Voice key to provider voice name mapping.

use std::collections::BTreeMap;

use serde::Serialize;

/// Built-in voice table: caller-facing key, provider voice name.
pub const BUILTIN_VOICES: &[(&str, &str)] = &[
    ("shimmer", "zh-CN-XiaoxiaoNeural"),
    ("alloy", "zh-CN-YunyangNeural"),
    ("fable", "zh-CN-YunjianNeural"),
    ("onyx", "zh-CN-XiaoyiNeural"),
    ("nova", "zh-CN-YunxiNeural"),
    ("echo", "zh-CN-liaoning-XiaobeiNeural"),
];

/// Read-only voice lookup table.
///
/// Built once at startup and shared behind an `Arc`; keys that are not in
/// the table resolve to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMap {
    entries: BTreeMap<String, String>,
}

/// One row of the voice table, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceEntry {
    pub key: String,
    pub voice: String,
}

impl Default for VoiceMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VoiceMap {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_pairs(
            BUILTIN_VOICES
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned())),
        )
    }

    /// Build a table from arbitrary pairs. Later pairs win.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Built-in table extended (or overridden) by `extra`.
    #[must_use]
    pub fn with_overrides(extra: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut map = Self::builtin();
        map.entries.extend(extra);
        map
    }

    /// Provider voice name for `key`, or `key` itself when unmapped.
    #[must_use]
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map_or(key, String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<VoiceEntry> {
        self.entries
            .iter()
            .map(|(key, voice)| VoiceEntry {
                key: key.clone(),
                voice: voice.clone(),
            })
            .collect()
    }
}
