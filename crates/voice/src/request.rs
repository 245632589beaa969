//! Inbound speech request.

use {
    serde::{Deserialize, Deserializer},
    serde_json::Value,
    voxrelay_cleaner::CleaningOptions,
};

use crate::error::{RelayError, Result};

/// Value used for `speed` and `pitch` when absent or, outside strict mode,
/// unparsable.
pub const DEFAULT_RATE: f32 = 1.0;

/// A caller's request for speech.
///
/// Deserializes from the JSON body of `POST /generate`:
/// `{"input", "voice", "speed", "pitch", "cleaningOptions"}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeechRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub input: String,
    /// Voice key. `None` selects the configured default voice.
    pub voice: Option<String>,
    pub speed: NumericParam,
    pub pitch: NumericParam,
    #[serde(deserialize_with = "null_as_default")]
    pub cleaning_options: CleaningOptions,
}

impl SpeechRequest {
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = NumericParam::Value(speed);
        self
    }

    #[must_use]
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = NumericParam::Value(pitch);
        self
    }

    #[must_use]
    pub fn with_cleaning(mut self, options: CleaningOptions) -> Self {
        self.cleaning_options = options;
        self
    }
}

/// A numeric request parameter as received on the wire.
///
/// Accepts JSON numbers and numeric strings (`"1.25"`). Anything else, or a
/// non-finite number, is kept as [`NumericParam::Invalid`] so the relay can
/// decide between defaulting and rejecting.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NumericParam {
    #[default]
    Absent,
    Value(f32),
    Invalid(String),
}

impl NumericParam {
    /// Resolve to a concrete value.
    ///
    /// Absent values become [`DEFAULT_RATE`]. Invalid values become
    /// [`DEFAULT_RATE`] unless `strict`, in which case they are a
    /// [`RelayError::Validation`] naming `field`.
    pub fn resolve(&self, field: &str, strict: bool) -> Result<f32> {
        match self {
            Self::Absent => Ok(DEFAULT_RATE),
            Self::Value(v) => Ok(*v),
            Self::Invalid(raw) if strict => Err(RelayError::validation(format!(
                "{field} must be a number, got {raw}"
            ))),
            Self::Invalid(_) => Ok(DEFAULT_RATE),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Number(n) => match n.as_f64().map(|f| f as f32) {
                // Out-of-range values overflow to infinity here.
                Some(f) if f.is_finite() => Self::Value(f),
                _ => Self::Invalid(n.to_string()),
            },
            Value::String(s) => match s.trim().parse::<f32>() {
                Ok(f) if f.is_finite() => Self::Value(f),
                _ => Self::Invalid(format!("{s:?}")),
            },
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for NumericParam {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt: Option<T> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SpeechRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_body_parses() {
        let req = parse(
            r#"{
                "input": "hello",
                "voice": "nova",
                "speed": 1.5,
                "pitch": 0.8,
                "cleaningOptions": {"removeMarkdown": true}
            }"#,
        );
        assert_eq!(req.input, "hello");
        assert_eq!(req.voice.as_deref(), Some("nova"));
        assert_eq!(req.speed, NumericParam::Value(1.5));
        assert_eq!(req.pitch, NumericParam::Value(0.8));
        assert!(req.cleaning_options.remove_markdown);
    }

    #[test]
    fn empty_body_uses_defaults() {
        let req = parse("{}");
        assert!(req.input.is_empty());
        assert!(req.voice.is_none());
        assert_eq!(req.speed.resolve("speed", true).unwrap(), 1.0);
        assert_eq!(req.pitch.resolve("pitch", true).unwrap(), 1.0);
        assert_eq!(req.cleaning_options, CleaningOptions::default());
    }

    #[test]
    fn nulls_are_treated_as_absent() {
        let req = parse(r#"{"input": null, "voice": null, "speed": null, "cleaningOptions": null}"#);
        assert!(req.input.is_empty());
        assert!(req.voice.is_none());
        assert_eq!(req.speed, NumericParam::Absent);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let req = parse(r#"{"speed": " 1.25 ", "pitch": "2"}"#);
        assert_eq!(req.speed, NumericParam::Value(1.25));
        assert_eq!(req.pitch, NumericParam::Value(2.0));
    }

    #[test]
    fn invalid_values_default_unless_strict() {
        let req = parse(r#"{"speed": "fast", "pitch": [1]}"#);
        assert_eq!(req.speed.resolve("speed", false).unwrap(), 1.0);
        assert_eq!(req.pitch.resolve("pitch", false).unwrap(), 1.0);

        let err = req.speed.resolve("speed", true).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
        assert_eq!(err.to_string(), r#"speed must be a number, got "fast""#);
    }

    #[test]
    fn non_finite_strings_are_invalid() {
        let req = parse(r#"{"speed": "NaN", "pitch": "inf"}"#);
        assert!(matches!(req.speed, NumericParam::Invalid(_)));
        assert!(matches!(req.pitch, NumericParam::Invalid(_)));
    }

    #[test]
    fn numbers_beyond_f32_range_are_invalid() {
        let req = parse(r#"{"speed": 1e39, "pitch": "-1e39"}"#);
        assert!(matches!(req.speed, NumericParam::Invalid(_)));
        assert!(matches!(req.pitch, NumericParam::Invalid(_)));
        assert!(req.speed.resolve("speed", true).is_err());
        assert_eq!(req.speed.resolve("speed", false).unwrap(), 1.0);
    }

    #[test]
    fn builder_sets_fields() {
        let req = SpeechRequest::new("hi").with_voice("alloy").with_speed(0.5).with_pitch(1.2);
        assert_eq!(req.voice.as_deref(), Some("alloy"));
        assert_eq!(req.speed, NumericParam::Value(0.5));
        assert_eq!(req.pitch, NumericParam::Value(1.2));
    }
}
