//! Incremental writer: regenerate a swatch file only when its content changed.
//!
//! The existing file acts as a cache keyed by color identity. A file that is
//! missing or fails to decode counts as "no prior state" and is regenerated.
//! Identifiers are carried forward only for codecs that store them; for the
//! binary container every rewrite assigns identifiers positionally.

use crate::codec::{Codec, Decoded};
use crate::diff::{self, PaletteDiff};
use crate::error::{Result, SwatchError};
use crate::ident::IdentityMap;
use crate::io;
use crate::model::Palette;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    Skipped,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOutcome::Written => "written",
            WriteOutcome::Skipped => "skipped",
        })
    }
}

/// Result of the read-and-compare half, without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub exists: bool,
    /// Set when the file exists but could not be decoded.
    pub corrupt: Option<String>,
    pub diff: PaletteDiff,
}

impl Plan {
    pub fn needs_rewrite(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// Decode whatever is at `path`: `(exists, decoded, corrupt reason)`.
/// A missing file and a corrupt one both yield no decoded state.
fn load_prior<C: Codec + ?Sized>(
    codec: &C,
    path: &Path,
) -> Result<(bool, Option<Decoded>, Option<String>)> {
    let Some(bytes) = io::read_if_exists(path).map_err(|e| e.at_path(path))? else {
        return Ok((false, None, None));
    };
    match codec.decode(&bytes) {
        Ok(decoded) => Ok((true, Some(decoded), None)),
        Err(SwatchError::Corrupt(reason)) => {
            tracing::warn!(
                path = %path.display(),
                %reason,
                "existing swatch file is unreadable; regenerating"
            );
            Ok((true, None, Some(reason)))
        }
        Err(e) => Err(e),
    }
}

pub fn plan<C: Codec + ?Sized>(codec: &C, path: &Path, palette: &Palette) -> Result<Plan> {
    let (exists, prior, corrupt) = load_prior(codec, path)?;
    let empty = BTreeMap::new();
    let (old_name, old_colors) = match &prior {
        Some(d) => (Some(d.name.as_str()), &d.colors),
        None => (None, &empty),
    };
    Ok(Plan {
        exists,
        corrupt,
        diff: diff::diff(palette, old_name, old_colors),
    })
}

/// Rewrite `path` with `palette` unless the file already describes the same
/// palette name and colors. Filesystem failures carry the offending path.
pub fn write_if_changed<C: Codec + ?Sized>(
    codec: &C,
    path: &Path,
    palette: &Palette,
) -> Result<WriteOutcome> {
    let (_, prior, _) = load_prior(codec, path)?;
    let changed = match &prior {
        Some(d) => diff::needs_rewrite(palette, Some(&d.name), &d.colors),
        None => diff::needs_rewrite(palette, None, &BTreeMap::new()),
    };
    if !changed {
        tracing::debug!(path = %path.display(), "swatch file up to date");
        return Ok(WriteOutcome::Skipped);
    }

    let ids = match prior {
        Some(d) if codec.stores_ids() => d.ids,
        _ => IdentityMap::new(),
    };
    let bytes = codec.encode(palette, &ids)?;
    io::atomic_write(path, &bytes).map_err(|e| e.at_path(path))?;
    tracing::info!(
        path = %path.display(),
        format = %codec.format(),
        entries = palette.entries.len(),
        prior_ids = ids.len(),
        "swatch file written"
    );
    Ok(WriteOutcome::Written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
