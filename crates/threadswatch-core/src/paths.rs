use crate::codec::Format;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "threadswatch.yaml";
pub const DEFAULT_CATALOG_FILE: &str = "catalog.yaml";
pub const DEFAULT_OUTPUT_DIR: &str = "swatches";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root; absolute paths win.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

/// `<output>/<format dir>/<stem>.<ext>`
pub fn swatch_path(output_dir: &Path, stem: &str, format: Format) -> PathBuf {
    output_dir
        .join(format.dir_name())
        .join(format!("{stem}.{}", format.extension()))
}

// ---------------------------------------------------------------------------
// File name sanitisation
// ---------------------------------------------------------------------------

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r"[^\w\s.\-]").unwrap())
}

/// Spaces become underscores; anything but word characters, `.` and `-` is
/// dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let underscored = name.replace(' ', "_");
    unsafe_re().replace_all(&underscored, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
