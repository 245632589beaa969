use {bytes::Bytes, thiserror::Error};

/// Message returned when cleaning leaves nothing to synthesize.
pub const EMPTY_TEXT_MESSAGE: &str = "cleaned text is empty or input missing";

/// Failure classes of a relay request.
///
/// None of them is retried at this layer.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request was rejected before contacting the provider.
    #[error("{0}")]
    Validation(String),

    /// The provider answered with a non-success status.
    ///
    /// `body` is the provider's raw response body, passed through untouched.
    #[error("provider returned HTTP {status}")]
    Upstream {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },

    /// The provider could not be reached, timed out, or dropped the stream.
    #[error("{0}")]
    Transport(String),
}

impl RelayError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Upstream { .. } => "upstream",
            Self::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
