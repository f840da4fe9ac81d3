//! Swatch identifiers and their per-file preservation.
//!
//! An identifier is a positive integer unique within one encoded palette.
//! Identifiers read back from an existing file are reused for entries whose
//! display name matches; every other entry gets the smallest integer not yet
//! taken in the same encoding pass.

use crate::model::Palette;
use std::collections::{BTreeSet, HashMap};

pub type SwatchId = u32;

/// `display_name -> SwatchId`, as recovered from an existing file.
pub type IdentityMap = HashMap<String, SwatchId>;

/// Hands out the smallest positive integer not yet reserved.
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: BTreeSet<SwatchId>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as taken. Returns false if it already was (or is zero).
    pub fn reserve(&mut self, id: SwatchId) -> bool {
        id != 0 && self.used.insert(id)
    }

    /// Allocate and reserve the smallest free identifier.
    pub fn allocate(&mut self) -> SwatchId {
        let mut candidate = 1;
        for &id in &self.used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        self.used.insert(candidate);
        candidate
    }
}

/// Resolve one identifier per entry, in entry order.
///
/// Reused identifiers are reserved before any allocation so a fresh entry
/// early in the list can never take an identifier a later entry is due to
/// keep. When two entries share a display name only the first keeps the
/// prior identifier.
pub fn assign(palette: &Palette, prior: &IdentityMap) -> Vec<SwatchId> {
    let mut alloc = IdAllocator::new();
    let mut slots: Vec<Option<SwatchId>> = palette
        .entries
        .iter()
        .map(|entry| {
            prior
                .get(&entry.display_name)
                .copied()
                .filter(|&id| alloc.reserve(id))
        })
        .collect();

    for slot in &mut slots {
        if slot.is_none() {
            *slot = Some(alloc.allocate());
        }
    }
    slots.into_iter().flatten().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
