//! Text cleaning applied to user input before it is sent for synthesis.
//!
//! Cleaning is a fixed-order list of pure transforms, each switched on by a
//! [`CleaningOptions`] flag:
//!
//! 1. markdown (links keep their label, code spans are dropped)
//! 2. supplementary-plane emoji
//! 3. URLs
//! 4. numeric citations (`[12]`)
//! 5. whitespace: drop all of it, or collapse runs of spaces
//! 6. custom literal keywords
//!
//! The result is always trimmed.

pub mod options;
pub mod transforms;

use tracing::trace;

pub use {
    options::CleaningOptions,
    transforms::{Transform, pipeline},
};

/// Clean `text` according to `options`.
///
/// Empty input is returned as-is without running any transform.
#[must_use]
pub fn clean(text: &str, options: &CleaningOptions) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut current = text.to_owned();
    for step in pipeline(options) {
        current = step.apply(&current);
        trace!(transform = step.name(), len = current.len(), "applied cleaning step");
    }
    current.trim().to_owned()
}
