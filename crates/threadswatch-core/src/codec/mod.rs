//! Swatch exchange formats.
//!
//! Each format implements [`Codec`]; the change detector and the incremental
//! writer work against the trait and never look at bytes themselves.

pub mod ase;
pub mod xml;

use crate::error::{Result, SwatchError};
use crate::ident::IdentityMap;
use crate::model::{Palette, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub use ase::AseCodec;
pub use xml::XmlCodec;

/// What a decoder recovers from an existing swatch file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decoded {
    pub name: String,
    pub colors: BTreeMap<String, Rgb>,
    /// Empty for formats that do not store identifiers.
    pub ids: IdentityMap,
}

pub trait Codec {
    fn format(&self) -> Format;

    fn encode(&self, palette: &Palette, ids: &IdentityMap) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded>;

    /// Whether `decode` can return identifiers to carry forward.
    fn stores_ids(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Ase,
    Xml,
}

impl Format {
    pub fn all() -> &'static [Format] {
        &[Format::Ase, Format::Xml]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Ase => "ase",
            Format::Xml => "xml",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Subdirectory of the output root that holds this format's files.
    pub fn dir_name(self) -> &'static str {
        match self {
            Format::Ase => "adobe-swatches",
            Format::Xml => "corel-swatches",
        }
    }

    /// Guess the format from a file extension, then from the leading bytes.
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Format> {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.to_ascii_lowercase().parse().ok());
        by_ext.or_else(|| {
            if bytes.starts_with(ase::MAGIC) {
                Some(Format::Ase)
            } else if xml::looks_like_xml(bytes) {
                Some(Format::Xml)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = SwatchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ase" => Ok(Format::Ase),
            "xml" => Ok(Format::Xml),
            other => Err(SwatchError::UnknownFormat(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
