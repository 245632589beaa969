//! Cleaning options supplied by the caller with each request.

use serde::{Deserialize, Deserializer, Serialize};

/// Toggles for the individual cleaning transforms.
///
/// Field names follow the camelCase JSON used by the web client
/// (`removeMarkdown`, `customKeywords`, ...). Every field is optional on the
/// wire and defaults to "off".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleaningOptions {
    /// Strip links, emphasis, heading markers and code spans.
    pub remove_markdown: bool,
    /// Strip supplementary-plane code points (most pictographic emoji).
    pub remove_emoji: bool,
    /// Strip `http://`, `https://` and `www.` tokens.
    pub remove_url: bool,
    /// Strip numeric citation markers such as `[12]`.
    pub remove_citations: bool,
    /// Delete every whitespace character instead of collapsing spaces.
    pub remove_whitespace: bool,
    /// Comma-separated literal substrings to delete.
    #[serde(deserialize_with = "null_as_empty")]
    pub custom_keywords: String,
}

impl CleaningOptions {
    /// Parsed custom keywords: split on commas, trimmed, empties dropped.
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        self.custom_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// `true` when no optional transform is enabled.
    ///
    /// Space collapsing and the final trim still run in that case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.remove_markdown
            && !self.remove_emoji
            && !self.remove_url
            && !self.remove_citations
            && !self.remove_whitespace
            && self.keywords().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
