//! Device status document and its display projection
//!
//! The device reports `{mode, sound, vibration, proximity}` as JSON.
//! Decoding is lenient: an absent or wrong-typed field falls back to its
//! default instead of failing the whole document, since sketch revisions
//! have shipped with fields missing or renamed.

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder shown when a field has no usable value
pub const EMPTY_FIELD: &str = "\u{2014}";

/// Status document reported by the device
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceStatus {
    /// Current display mode token, e.g. "DAY"
    #[serde(default, deserialize_with = "lenient_string")]
    pub mode: String,
    /// Raw sound flag as reported; interpret through [`Polarity`]
    #[serde(default, deserialize_with = "lenient_bool")]
    pub sound: bool,
    /// Raw vibration flag as reported; interpret through [`Polarity`]
    #[serde(default, deserialize_with = "lenient_bool")]
    pub vibration: bool,
    /// Proximity reading, absent when the sensor has nothing to report
    #[serde(default, deserialize_with = "lenient_number")]
    pub proximity: Option<i64>,
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_bool().unwrap_or_default())
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value.as_i64())
}

impl DeviceStatus {
    /// Decode a status document from raw JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("status document is not an object"));
        }
        Self::deserialize(value)
    }
}

/// How a reported boolean maps onto "detected"
///
/// The firmware comment asserts active-high for sound and vibration but
/// this was never verified against the hardware, so the mapping stays
/// configurable rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// `true` means detected/on
    #[default]
    ActiveHigh,
    /// `false` means detected/on
    ActiveLow,
}

impl Polarity {
    /// Interpret a raw reported flag
    pub fn detected(self, raw: bool) -> bool {
        match self {
            Polarity::ActiveHigh => raw,
            Polarity::ActiveLow => !raw,
        }
    }

    fn label(self, raw: bool) -> &'static str {
        if self.detected(raw) {
            "Detected"
        } else {
            "None"
        }
    }
}

/// Fixed four-field projection of a status document for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub mode: String,
    pub sound: String,
    pub vibration: String,
    pub proximity: String,
}

impl StatusView {
    /// Project a status document using the given boolean polarity
    pub fn project(status: &DeviceStatus, polarity: Polarity) -> Self {
        let mode = if status.mode.is_empty() {
            EMPTY_FIELD.to_string()
        } else {
            status.mode.clone()
        };
        let proximity = match status.proximity {
            Some(value) => value.to_string(),
            None => EMPTY_FIELD.to_string(),
        };

        Self {
            mode,
            sound: polarity.label(status.sound).to_string(),
            vibration: polarity.label(status.vibration).to_string(),
            proximity,
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Mode:      {}", self.mode)?;
        writeln!(f, "  Sound:     {}", self.sound)?;
        writeln!(f, "  Vibration: {}", self.vibration)?;
        write!(f, "  Proximity: {}", self.proximity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_document() {
        let status = DeviceStatus::from_json(
            br#"{"mode":"DAY","sound":false,"vibration":true,"proximity":12}"#,
        )
        .unwrap();
        assert_eq!(status.mode, "DAY");
        assert!(!status.sound);
        assert!(status.vibration);
        assert_eq!(status.proximity, Some(12));
    }

    #[test]
    fn test_absent_fields_default() {
        let status = DeviceStatus::from_json(b"{}").unwrap();
        assert_eq!(status, DeviceStatus::default());
        assert_eq!(status.proximity, None);
    }

    #[test]
    fn test_wrong_typed_fields_default() {
        let status = DeviceStatus::from_json(
            br#"{"mode":7,"sound":"loud","vibration":null,"proximity":"near"}"#,
        )
        .unwrap();
        assert_eq!(status.mode, "");
        assert!(!status.sound);
        assert!(!status.vibration);
        assert_eq!(status.proximity, None);
    }

    #[test]
    fn test_non_object_document_is_an_error() {
        assert!(DeviceStatus::from_json(b"[1,2,3]").is_err());
        assert!(DeviceStatus::from_json(b"not json").is_err());
    }

    #[test]
    fn test_projection_renders_fixed_fields() {
        let status = DeviceStatus {
            mode: "DAY".into(),
            sound: false,
            vibration: true,
            proximity: Some(12),
        };
        let view = StatusView::project(&status, Polarity::ActiveHigh);
        assert_eq!(view.mode, "DAY");
        assert_eq!(view.sound, "None");
        assert_eq!(view.vibration, "Detected");
        assert_eq!(view.proximity, "12");
    }

    #[test]
    fn test_projection_placeholders() {
        let view = StatusView::project(&DeviceStatus::default(), Polarity::ActiveHigh);
        assert_eq!(view.mode, EMPTY_FIELD);
        assert_eq!(view.proximity, EMPTY_FIELD);
    }

    #[test]
    fn test_active_low_inverts_labels() {
        let status = DeviceStatus {
            sound: false,
            vibration: true,
            ..Default::default()
        };
        let view = StatusView::project(&status, Polarity::ActiveLow);
        assert_eq!(view.sound, "Detected");
        assert_eq!(view.vibration, "None");
    }
}
