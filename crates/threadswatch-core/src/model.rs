use crate::error::{Result, SwatchError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build from wider integers (database columns), rejecting anything
    /// outside `0..=255`.
    pub fn from_channels(red: i64, green: i64, blue: i64) -> Result<Self> {
        Ok(Self {
            red: channel("red", red)?,
            green: channel("green", green)?,
            blue: channel("blue", blue)?,
        })
    }

    /// Channels normalized to `[0, 1]`, in red, green, blue order.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.red) / 255.0,
            f32::from(self.green) / 255.0,
            f32::from(self.blue) / 255.0,
        ]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

fn channel(label: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        SwatchError::Encoding(format!("{label} channel {value} is outside 0..=255"))
    })
}

/// Convert a normalized channel back to 8 bits: `round(value * 255)`,
/// clamped to the valid range.
pub fn unit_to_channel(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    Some((value * 255.0).round().clamp(0.0, 255.0) as u8)
}

// ---------------------------------------------------------------------------
// ColorEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub display_name: String,
    #[serde(flatten)]
    pub rgb: Rgb,
}

impl ColorEntry {
    pub fn new(display_name: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            display_name: display_name.into(),
            rgb,
        }
    }
}

/// Build the label shown for a thread: `"{code} - {name}"` when both halves
/// are present, otherwise whichever one is.
pub fn display_name(code: &str, name: &str) -> Result<String> {
    let code = code.trim();
    let name = name.trim();
    match (code.is_empty(), name.is_empty()) {
        (false, false) => Ok(format!("{code} - {name}")),
        (true, false) => Ok(name.to_string()),
        (false, true) => Ok(code.to_string()),
        (true, true) => Err(SwatchError::Encoding(
            "thread has neither a code nor a name".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub entries: Vec<ColorEntry>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, display_name: impl Into<String>, rgb: Rgb) -> Self {
        self.entries.push(ColorEntry::new(display_name, rgb));
        self
    }

    /// Check the invariants every encoder relies on.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SwatchError::Encoding("palette name is empty".to_string()));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.display_name.is_empty() {
                return Err(SwatchError::Encoding(format!(
                    "entry {} in palette '{}' has an empty display name",
                    i + 1,
                    self.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_variants() {
        assert_eq!(display_name("0345", "Moss").unwrap(), "0345 - Moss");
        assert_eq!(display_name("", "Moss").unwrap(), "Moss");
        assert_eq!(display_name("0345", "").unwrap(), "0345");
        assert_eq!(display_name(" 0345 ", "  ").unwrap(), "0345");
        assert!(display_name("", " ").is_err());
    }

    #[test]
    fn channels_out_of_range_rejected() {
        assert!(Rgb::from_channels(0, 255, 128).is_ok());
        assert!(matches!(
            Rgb::from_channels(256, 0, 0),
            Err(SwatchError::Encoding(_))
        ));
        assert!(Rgb::from_channels(0, -1, 0).is_err());
    }

    #[test]
    fn every_channel_survives_unit_conversion() {
        for v in 0..=255u8 {
            let unit = Rgb::new(v, v, v).to_unit()[0];
            assert_eq!(unit_to_channel(f64::from(unit)), Some(v));
        }
    }

    #[test]
    fn unit_to_channel_clamps_and_rejects_nan() {
        assert_eq!(unit_to_channel(1.5), Some(255));
        assert_eq!(unit_to_channel(-0.2), Some(0));
        assert_eq!(unit_to_channel(f64::NAN), None);
    }

    #[test]
    fn validate_rejects_empty_names() {
        assert!(Palette::new("").validate().is_err());
        let p = Palette::new("Reds").with_entry("", Rgb::new(1, 2, 3));
        assert!(p.validate().is_err());
        let p = Palette::new("Reds").with_entry("Moss", Rgb::new(1, 2, 3));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::new(110, 90, 33).to_hex(), "#6e5a21");
    }
}
