//! Adobe Swatch Exchange (`.ase`) container.
//!
//! Layout, big-endian throughout:
//!
//! ```text
//! "ASEF" | version u32 | chunk count u32
//! C001 0000 | len u16 | name                      palette group open
//! 0001 0000 | len u16 | name | "RGB " | f32 x3 | 0002   one per swatch
//! C002 0000 | 0000                                palette group close / EOF
//! ```
//!
//! A name is a `u16` count of UTF-16 code units including the terminator,
//! the UTF-16BE units, then two zero bytes. Chunk length counts body bytes
//! only; a reader skips `len + 6` bytes to reach the next chunk.

use super::{Codec, Decoded, Format};
use crate::error::{Result, SwatchError};
use crate::ident::{self, IdentityMap};
use crate::model::{unit_to_channel, Palette, Rgb};
use std::collections::BTreeMap;

pub const MAGIC: &[u8; 4] = b"ASEF";
pub const VERSION: u32 = 0x0001_0000;

const GROUP_START: u32 = 0xC001_0000;
const GROUP_END: u32 = 0xC002_0000;
const SWATCH: u32 = 0x0001_0000;

const COLOR_MODEL_RGB: &[u8; 4] = b"RGB ";
const SWATCH_END: u16 = 0x0002;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct AseCodec;

impl Codec for AseCodec {
    fn format(&self) -> Format {
        Format::Ase
    }

    /// Identifiers are resolved as for every format, but the binary layout
    /// has no field for them, so they do not affect the output.
    fn encode(&self, palette: &Palette, ids: &IdentityMap) -> Result<Vec<u8>> {
        let bytes = encode(palette)?;
        let assigned = ident::assign(palette, ids);
        let reused = palette
            .entries
            .iter()
            .zip(&assigned)
            .filter(|(e, id)| ids.get(&e.display_name) == Some(*id))
            .count();
        tracing::debug!(
            palette = %palette.name,
            assigned = assigned.len(),
            reused,
            "ase identifiers resolved, not stored"
        );
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        decode(bytes)
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub fn encode(palette: &Palette) -> Result<Vec<u8>> {
    palette.validate()?;

    let chunk_count = u32::try_from(palette.entries.len() + 2).map_err(|_| {
        SwatchError::Encoding(format!("palette '{}' has too many entries", palette.name))
    })?;

    let mut out = Vec::with_capacity(64 + palette.entries.len() * 64);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_be_bytes());
    out.extend_from_slice(&chunk_count.to_be_bytes());

    let name = utf16(&palette.name);
    out.extend_from_slice(&GROUP_START.to_be_bytes());
    out.extend_from_slice(&body_len(4 + 2 * name.len(), &palette.name)?.to_be_bytes());
    push_name(&mut out, &name);

    for entry in &palette.entries {
        let label = utf16(&entry.display_name);
        out.extend_from_slice(&SWATCH.to_be_bytes());
        out.extend_from_slice(&body_len(2 * label.len() + 22, &entry.display_name)?.to_be_bytes());
        push_name(&mut out, &label);
        out.extend_from_slice(COLOR_MODEL_RGB);
        for unit in entry.rgb.to_unit() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        out.extend_from_slice(&SWATCH_END.to_be_bytes());
    }

    out.extend_from_slice(&GROUP_END.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    Ok(out)
}

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn body_len(len: usize, label: &str) -> Result<u16> {
    u16::try_from(len)
        .map_err(|_| SwatchError::Encoding(format!("name too long for a swatch chunk: '{label}'")))
}

/// String length (units + terminator), the units, then the zero terminator.
/// Callers have already bounded `units` through `body_len`.
fn push_name(out: &mut Vec<u8>, units: &[u16]) {
    out.extend_from_slice(&((units.len() + 1) as u16).to_be_bytes());
    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!(
            "{} bytes is shorter than the {HEADER_LEN}-byte header",
            bytes.len()
        )));
    }
    if &bytes[..4] != MAGIC {
        return Err(corrupt("missing ASEF signature"));
    }
    let version = read_u32(bytes, 4)?;
    if version != VERSION {
        tracing::debug!(version = %format!("{version:#010x}"), "unexpected ase version");
    }

    let mut group_at = HEADER_LEN;
    loop {
        let tag = read_u32(bytes, group_at).map_err(|_| corrupt("no palette group chunk"))?;
        if tag == GROUP_START {
            break;
        }
        let body = chunk_body(bytes, group_at)?;
        tracing::debug!(tag = %format!("{tag:#010x}"), offset = group_at, "skipping ase chunk");
        group_at += CHUNK_HEADER_LEN + body.len();
    }
    let group = chunk_body(bytes, group_at)?;
    let (name, _) = read_name(group, group_at + CHUNK_HEADER_LEN)?;

    let mut colors = BTreeMap::new();
    let mut cursor = group_at + CHUNK_HEADER_LEN + group.len();
    loop {
        let tag = read_u32(bytes, cursor)
            .map_err(|_| corrupt(format!("data ends at offset {cursor} before palette close")))?;
        if tag == GROUP_END {
            break;
        }
        let body = chunk_body(bytes, cursor)?;
        if tag == SWATCH {
            if let Some((label, rgb)) = read_swatch(body, cursor + CHUNK_HEADER_LEN)? {
                colors.insert(label, rgb);
            }
        } else {
            tracing::debug!(tag = %format!("{tag:#010x}"), offset = cursor, "skipping ase chunk");
        }
        cursor += CHUNK_HEADER_LEN + body.len();
    }

    Ok(Decoded {
        name,
        colors,
        ids: IdentityMap::new(),
    })
}

fn corrupt(msg: impl Into<String>) -> SwatchError {
    SwatchError::Corrupt(msg.into())
}

fn slice(bytes: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    at.checked_add(len)
        .and_then(|end| bytes.get(at..end))
        .ok_or_else(|| {
            corrupt(format!(
                "truncated at offset {at}: need {len} bytes, {} available",
                bytes.len().saturating_sub(at)
            ))
        })
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    let b = slice(bytes, at, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    let b = slice(bytes, at, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Body of the chunk whose tag starts at `at`, bounds-checked against the
/// declared length.
fn chunk_body(bytes: &[u8], at: usize) -> Result<&[u8]> {
    let len = read_u16(bytes, at + 4)?;
    slice(bytes, at + CHUNK_HEADER_LEN, usize::from(len))
}

/// Decode a length-prefixed name at the start of `body`. Returns the name
/// and the number of bytes it occupied, terminator included. `offset` is the
/// body's position in the file, for error messages.
fn read_name(body: &[u8], offset: usize) -> Result<(String, usize)> {
    let count = usize::from(read_u16(body, 0).map_err(|_| name_overrun(offset))?);
    let units = count.saturating_sub(1);
    let raw = slice(body, 2, 2 * units).map_err(|_| name_overrun(offset))?;
    let consumed = 2 + 2 * count;
    if consumed > body.len() {
        return Err(name_overrun(offset));
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    let name = String::from_utf16(&units)
        .map_err(|_| corrupt(format!("invalid UTF-16 name at offset {offset}")))?;
    Ok((name, consumed))
}

fn name_overrun(offset: usize) -> SwatchError {
    corrupt(format!("name at offset {offset} overruns its chunk"))
}

/// `None` for well-framed swatches in a color model other than RGB.
fn read_swatch(body: &[u8], offset: usize) -> Result<Option<(String, Rgb)>> {
    let (label, used) = read_name(body, offset)?;
    let model = slice(body, used, 4)
        .map_err(|_| corrupt(format!("swatch at offset {offset} has no color model")))?;
    if model != COLOR_MODEL_RGB {
        let model = String::from_utf8_lossy(model);
        tracing::debug!(swatch = %label, model = %model.trim_end(), "skipping non-RGB swatch");
        return Ok(None);
    }
    let floats = slice(body, used + 4, 12)
        .map_err(|_| corrupt(format!("swatch '{label}' is missing channel values")))?;
    let mut channels = [0u8; 3];
    for (slot, raw) in channels.iter_mut().zip(floats.chunks_exact(4)) {
        let value = f32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        *slot = unit_to_channel(f64::from(value))
            .ok_or_else(|| corrupt(format!("swatch '{label}' has a non-finite channel")))?;
    }
    let [red, green, blue] = channels;
    Ok(Some((label, Rgb::new(red, green, blue))))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
