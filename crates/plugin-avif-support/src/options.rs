//! The plugin's option record and how it is read from the store.
//!
//! The record is loose JSON written by several plugin revisions and by hand,
//! so reading is forgiving. Numeric keys are read with integer-cast rules:
//! floats truncate, strings contribute their leading integer and anything
//! else counts as `0`. The legacy `target_format` key stands in for
//! `handling_mode`, and out-of-range quality is clamped. Writes go through
//! [`AvifOptions::to_record`] after validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;
use validator::Validate;

use mediahub_plugin::settings::SettingsLifecycle;

use crate::error::AvifError;

/// Lowest accepted quality.
pub const MIN_QUALITY: u8 = 1;
/// Highest accepted quality.
pub const MAX_QUALITY: u8 = 100;
/// Quality used when none is stored.
pub const DEFAULT_QUALITY: u8 = 80;

/// Keys read from the stored record.
const OPTION_KEYS: [&str; 5] = [
    "enabled",
    "handling_mode",
    "target_format",
    "quality",
    "recompress",
];

/// What to do with an accepted AVIF upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HandlingMode {
    /// Keep the file as uploaded.
    #[default]
    AsIs,
    /// Re-encode in place as AVIF.
    ConvertToPrimary,
    /// Transcode to WebP through the sibling codec.
    ConvertToAlternate,
    /// A stored value this version does not know. Behaves as [`Self::AsIs`].
    Unrecognized(String),
}

impl HandlingMode {
    /// Stored form of the mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AsIs => "asis",
            Self::ConvertToPrimary => "convert",
            Self::ConvertToAlternate => "webp",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Parses a stored value, keeping unknown strings.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| Self::Unrecognized(raw.to_string()))
    }

    /// Maps the earlier `target_format` key onto a mode.
    fn from_target_format(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "avif" => Self::AsIs,
            "webp" => Self::ConvertToAlternate,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl FromStr for HandlingMode {
    type Err = AvifError;

    /// Strict parse: unknown strings are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asis" => Ok(Self::AsIs),
            "convert" => Ok(Self::ConvertToPrimary),
            "webp" => Ok(Self::ConvertToAlternate),
            _ => Err(AvifError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for HandlingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HandlingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HandlingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_stored(&raw))
    }
}

/// The plugin's configuration, as seen by one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AvifOptions {
    /// Master switch for MIME registration and upload handling.
    pub enabled: bool,
    /// What to do with accepted AVIF uploads.
    pub handling_mode: HandlingMode,
    /// Encoder quality.
    #[validate(range(min = 1, max = 100))]
    pub quality: u8,
    /// Re-encode as-is uploads in place.
    pub recompress: bool,
}

impl Default for AvifOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            handling_mode: HandlingMode::AsIs,
            quality: DEFAULT_QUALITY,
            recompress: false,
        }
    }
}

impl AvifOptions {
    /// Reads the current options through the settings lifecycle, one key
    /// at a time.
    ///
    /// Goes to the store on every call.
    pub async fn load(settings: &SettingsLifecycle) -> Result<Self, AvifError> {
        let mut record = Map::new();
        for key in OPTION_KEYS {
            let value = settings.get(key, Value::Null).await?;
            if !value.is_null() {
                record.insert(key.to_string(), value);
            }
        }
        Ok(Self::from_record(&record))
    }

    /// Builds options from a stored record, filling gaps with defaults.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let enabled = record
            .get("enabled")
            .map(|v| read_flag("enabled", v, defaults.enabled))
            .unwrap_or(defaults.enabled);

        let stored_mode = record.get("handling_mode").filter(|v| !v.is_null());
        let handling_mode = match (stored_mode, record.get("target_format")) {
            (Some(Value::String(mode)), _) => HandlingMode::from_stored(mode),
            (Some(other), _) => HandlingMode::Unrecognized(other.to_string()),
            (None, Some(Value::String(target))) => HandlingMode::from_target_format(target),
            _ => defaults.handling_mode,
        };
        if let HandlingMode::Unrecognized(raw) = &handling_mode {
            warn!(mode = %raw, "Unrecognized handling mode, treating as asis");
        }

        let quality = record
            .get("quality")
            .map(|v| read_quality(v, defaults.quality))
            .unwrap_or(defaults.quality);

        let recompress = record
            .get("recompress")
            .map(|v| read_flag("recompress", v, defaults.recompress))
            .unwrap_or(defaults.recompress);

        Self {
            enabled,
            handling_mode,
            quality,
            recompress,
        }
    }

    /// Stored form. Switches are written as `0`/`1` like the settings form does.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("enabled".to_string(), Value::from(u8::from(self.enabled)));
        record.insert(
            "handling_mode".to_string(),
            Value::from(self.handling_mode.as_str()),
        );
        record.insert("quality".to_string(), Value::from(self.quality));
        record.insert(
            "recompress".to_string(),
            Value::from(u8::from(self.recompress)),
        );
        record
    }

    /// Record written on first activation.
    pub fn activation_defaults() -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("enabled".to_string(), Value::from(1));
        record.insert(
            "handling_mode".to_string(),
            Value::from(HandlingMode::AsIs.as_str()),
        );
        record.insert("quality".to_string(), Value::from(DEFAULT_QUALITY));
        record
    }

    /// Validates and writes the options back to the store.
    pub async fn save(&self, settings: &SettingsLifecycle) -> Result<(), AvifError> {
        self.validate()?;
        if let HandlingMode::Unrecognized(raw) = &self.handling_mode {
            return Err(AvifError::UnknownMode(raw.clone()));
        }
        settings.update(self.to_record()).await?;
        Ok(())
    }
}

/// Reads a switch value. On only when it casts to the integer `1`, so
/// `true`, `1`, `1.0` and `"1"` enable while `2` and `"yes"` do not.
fn read_flag(key: &str, value: &Value, default: bool) -> bool {
    match value {
        Value::Null => default,
        Value::Array(_) | Value::Object(_) => {
            warn!(key = %key, value = %value, "Switch has unexpected type, using default");
            default
        }
        other => cast_int(other) == Some(1),
    }
}

/// Reads quality, clamping out-of-range values into `1..=100`.
///
/// Fractions are truncated. A value with no integer in it keeps `default`.
fn read_quality(value: &Value, default: u8) -> u8 {
    let Some(raw) = cast_int(value) else {
        warn!(value = %value, "Quality is not a number, using default");
        return default;
    };

    let clamped = raw.clamp(i64::from(MIN_QUALITY), i64::from(MAX_QUALITY));
    if clamped != raw {
        warn!(quality = raw, clamped, "Quality out of range, clamped");
    }
    clamped as u8
}

/// Integer cast of a stored scalar.
///
/// Booleans are `0`/`1`, floats truncate toward zero and strings yield their
/// leading integer after optional whitespace and sign. Returns `None` when
/// there is no integer to take.
fn cast_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
