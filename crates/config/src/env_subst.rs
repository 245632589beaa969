//! `${VAR}` placeholder expansion for raw config text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A closed `${...}` placeholder with a non-empty name.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("invalid placeholder pattern"));

/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable variables, `${}` and unterminated `${` are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

pub(crate) fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// `true` if `value` still contains a `${...}` placeholder.
#[must_use]
pub fn has_placeholder(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}
