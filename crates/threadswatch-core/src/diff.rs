use crate::model::{Palette, Rgb};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Decide whether the file holding `old_*` must be regenerated for `new`.
///
/// Only the palette name and the `display_name -> rgb` set matter; entry
/// order and identifiers never trigger a rewrite.
pub fn needs_rewrite(
    new: &Palette,
    old_name: Option<&str>,
    old_colors: &BTreeMap<String, Rgb>,
) -> bool {
    if old_name != Some(new.name.as_str()) {
        return true;
    }

    // later duplicates win, as they do when a file is decoded
    let new_colors: BTreeMap<&str, Rgb> = new
        .entries
        .iter()
        .map(|e| (e.display_name.as_str(), e.rgb))
        .collect();
    new_colors.len() != old_colors.len()
        || old_colors
            .iter()
            .any(|(name, rgb)| new_colors.get(name.as_str()) != Some(rgb))
}

// ---------------------------------------------------------------------------
// PaletteDiff
// ---------------------------------------------------------------------------

/// What changed between an existing file and fresh source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaletteDiff {
    /// `(old, new)` palette name, when it differs or there was no prior file.
    pub renamed: Option<(Option<String>, String)>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub recolored: Vec<Recolor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recolor {
    pub name: String,
    pub old: Rgb,
    pub new: Rgb,
}

impl PaletteDiff {
    pub fn is_empty(&self) -> bool {
        self.renamed.is_none()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.recolored.is_empty()
    }

    /// Human-readable summary: "renamed, 2 added, 1 removed, 3 recolored"
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "unchanged".to_string();
        }
        let mut parts = Vec::new();
        match &self.renamed {
            Some((None, _)) => parts.push("new file".to_string()),
            Some((Some(_), _)) => parts.push("renamed".to_string()),
            None => {}
        }
        for (count, label) in [
            (self.added.len(), "added"),
            (self.removed.len(), "removed"),
            (self.recolored.len(), "recolored"),
        ] {
            if count > 0 {
                parts.push(format!("{count} {label}"));
            }
        }
        parts.join(", ")
    }
}

/// Full comparison. `diff(..).is_empty()` agrees with `!needs_rewrite(..)`.
pub fn diff(new: &Palette, old_name: Option<&str>, old_colors: &BTreeMap<String, Rgb>) -> PaletteDiff {
    let renamed = (old_name != Some(new.name.as_str()))
        .then(|| (old_name.map(str::to_string), new.name.clone()));

    let new_colors: BTreeMap<&str, Rgb> = new
        .entries
        .iter()
        .map(|e| (e.display_name.as_str(), e.rgb))
        .collect();

    let mut added = Vec::new();
    let mut recolored = Vec::new();
    let mut seen = BTreeSet::new();
    for entry in &new.entries {
        let name = entry.display_name.as_str();
        if !seen.insert(name) {
            continue;
        }
        let rgb = new_colors[name];
        match old_colors.get(name) {
            None => added.push(name.to_string()),
            Some(old) if *old != rgb => recolored.push(Recolor {
                name: name.to_string(),
                old: *old,
                new: rgb,
            }),
            Some(_) => {}
        }
    }
    let removed = old_colors
        .keys()
        .filter(|k| !new_colors.contains_key(k.as_str()))
        .cloned()
        .collect();

    PaletteDiff {
        renamed,
        added,
        removed,
        recolored,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
