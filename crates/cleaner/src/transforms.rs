//! Individual cleaning transforms.
//!
//! Each transform is a total `&str -> String` function. [`pipeline`] selects
//! and orders them from a [`CleaningOptions`] value.

use std::sync::LazyLock;

use regex::Regex;

use crate::CleaningOptions;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        #[allow(clippy::expect_used)]
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("invalid pattern: ", $re)));
    };
}

// Markdown, applied in this order.
pattern!(MD_LINK, r"\[([^\]]+)\]\([^)]+\)");
pattern!(MD_BOLD, r"\*\*(.*?)\*\*|__(.*?)__");
pattern!(MD_ITALIC, r"\*(.*?)\*|_(.*?)_");
pattern!(MD_HEADING, r"#{1,6}\s?");
pattern!(MD_CODE, r"(?s)`{1,3}.*?`{1,3}");

pattern!(URL, r"https?://\S+|www\.\S+");
pattern!(CITATION, r"\[\d+\]");
pattern!(SPACE_RUN, r" {2,}");

/// First code point outside the Basic Multilingual Plane.
const SUPPLEMENTARY_START: u32 = 0x1_0000;

/// One step of the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Markdown,
    Emoji,
    Url,
    Citations,
    /// Delete every whitespace character, newlines included.
    DropWhitespace,
    /// Collapse runs of spaces to a single space. Newlines are kept.
    CollapseSpaces,
    /// Literal keyword removal, applied in list order.
    Keywords(Vec<String>),
}

impl Transform {
    /// Stable name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Emoji => "emoji",
            Self::Url => "url",
            Self::Citations => "citations",
            Self::DropWhitespace => "drop_whitespace",
            Self::CollapseSpaces => "collapse_spaces",
            Self::Keywords(_) => "keywords",
        }
    }

    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Markdown => strip_markdown(input),
            Self::Emoji => strip_emoji(input),
            Self::Url => URL.replace_all(input, "").into_owned(),
            Self::Citations => CITATION.replace_all(input, "").into_owned(),
            Self::DropWhitespace => input.chars().filter(|c| !c.is_whitespace()).collect(),
            Self::CollapseSpaces => SPACE_RUN.replace_all(input, " ").into_owned(),
            Self::Keywords(keywords) => strip_keywords(input, keywords),
        }
    }
}

/// Build the ordered transform list for `options`.
///
/// Exactly one of [`Transform::DropWhitespace`] and
/// [`Transform::CollapseSpaces`] is always present.
#[must_use]
pub fn pipeline(options: &CleaningOptions) -> Vec<Transform> {
    let mut steps = Vec::with_capacity(6);
    if options.remove_markdown {
        steps.push(Transform::Markdown);
    }
    if options.remove_emoji {
        steps.push(Transform::Emoji);
    }
    if options.remove_url {
        steps.push(Transform::Url);
    }
    if options.remove_citations {
        steps.push(Transform::Citations);
    }
    steps.push(if options.remove_whitespace {
        Transform::DropWhitespace
    } else {
        Transform::CollapseSpaces
    });
    let keywords = options.keywords();
    if !keywords.is_empty() {
        steps.push(Transform::Keywords(keywords));
    }
    steps
}

fn strip_markdown(input: &str) -> String {
    let text = MD_LINK.replace_all(input, "${1}");
    let text = MD_BOLD.replace_all(&text, "${1}${2}");
    let text = MD_ITALIC.replace_all(&text, "${1}${2}");
    let text = MD_HEADING.replace_all(&text, "");
    MD_CODE.replace_all(&text, "").into_owned()
}

fn strip_emoji(input: &str) -> String {
    input
        .chars()
        .filter(|c| u32::from(*c) < SUPPLEMENTARY_START)
        .collect()
}

fn strip_keywords(input: &str, keywords: &[String]) -> String {
    keywords
        .iter()
        .fold(input.to_owned(), |text, kw| text.replace(kw.as_str(), ""))
}
