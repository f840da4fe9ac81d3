//! Chart and thread rows, and how they become palettes.

pub mod catalog;
pub mod sqlite;

use crate::config::SourceConfig;
use crate::error::{Result, SwatchError};
use crate::model::{display_name, ColorEntry, Palette, Rgb};
use crate::paths;
use serde::Serialize;
use std::path::Path;

pub use catalog::YamlCatalog;
pub use sqlite::SqliteSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub id: i64,
    pub brand: String,
    pub chart: String,
}

impl Chart {
    /// `chart` alone when it repeats the brand, else `"{brand} - {chart}"`.
    pub fn palette_name(&self) -> String {
        if self.brand == self.chart {
            self.chart.clone()
        } else {
            format!("{} - {}", self.brand, self.chart)
        }
    }

    /// Sanitised file stem; falls back to the chart id when nothing survives
    /// sanitisation.
    pub fn file_stem(&self) -> String {
        let raw = if self.brand == self.chart {
            self.brand.clone()
        } else {
            format!("{}_{}", self.brand, self.chart)
        };
        let stem = paths::sanitize_file_name(&raw);
        if stem.trim_matches(['_', '.', '-']).is_empty() {
            format!("chart-{}", self.id)
        } else {
            stem
        }
    }
}

/// One thread as stored upstream; channels stay wide until validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub red: i64,
    pub green: i64,
    pub blue: i64,
}

/// Supplies enabled charts and their enabled threads, in a stable order.
pub trait CatalogSource {
    fn charts(&mut self) -> Result<Vec<Chart>>;

    fn threads(&mut self, chart: &Chart) -> Result<Vec<ThreadRow>>;
}

/// Open the configured source, resolving its path against `root`.
pub fn open(config: &SourceConfig, root: &Path) -> Result<Box<dyn CatalogSource>> {
    let path = paths::resolve(root, config.path());
    match config {
        SourceConfig::Sqlite { .. } => Ok(Box::new(SqliteSource::open(&path)?)),
        SourceConfig::Catalog { .. } => Ok(Box::new(YamlCatalog::load(&path)?)),
    }
}

/// Build the palette for `chart`. A row with no label or an out-of-range
/// channel fails the whole palette.
pub fn to_palette(chart: &Chart, rows: &[ThreadRow]) -> Result<Palette> {
    let entries = rows
        .iter()
        .map(|row| {
            let label = display_name(&row.code, &row.name);
            let rgb = Rgb::from_channels(row.red, row.green, row.blue);
            match (label, rgb) {
                (Ok(label), Ok(rgb)) => Ok(ColorEntry::new(label, rgb)),
                (Err(e), _) | (_, Err(e)) => Err(SwatchError::Encoding(format!(
                    "thread {} in chart {}: {}",
                    row.id,
                    chart.id,
                    strip_prefix(e)
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Palette {
        name: chart.palette_name(),
        entries,
    })
}

fn strip_prefix(e: SwatchError) -> String {
    match e {
        SwatchError::Encoding(msg) => msg,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(brand: &str, name: &str) -> Chart {
        Chart {
            id: 47,
            brand: brand.to_string(),
            chart: name.to_string(),
        }
    }

    fn row(id: i64, code: &str, name: &str, rgb: (i64, i64, i64)) -> ThreadRow {
        ThreadRow {
            id,
            code: code.to_string(),
            name: name.to_string(),
            red: rgb.0,
            green: rgb.1,
            blue: rgb.2,
        }
    }

    #[test]
    fn palette_and_file_names() {
        let same = chart("Isacord", "Isacord");
        assert_eq!(same.palette_name(), "Isacord");
        assert_eq!(same.file_stem(), "Isacord");

        let different = chart("Madeira", "Polyneon 40");
        assert_eq!(different.palette_name(), "Madeira - Polyneon 40");
        assert_eq!(different.file_stem(), "Madeira_Polyneon_40");

        assert_eq!(chart("???", "???").file_stem(), "chart-47");
    }

    #[test]
    fn rows_become_entries_in_order() {
        let rows = [
            row(1, "0345", "Moss", (110, 90, 33)),
            row(2, "", "Marsh", (180, 171, 93)),
            row(3, "0442", "", (156, 132, 51)),
        ];
        let p = to_palette(&chart("Reds", "Reds"), &rows).unwrap();
        assert_eq!(p.name, "Reds");
        let names: Vec<_> = p.entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["0345 - Moss", "Marsh", "0442"]);
        assert_eq!(p.entries[0].rgb, Rgb::new(110, 90, 33));
    }

    #[test]
    fn bad_row_fails_the_palette() {
        let rows = [row(9, "1", "Hot", (300, 0, 0))];
        let err = to_palette(&chart("Reds", "Reds"), &rows).unwrap_err();
        assert!(matches!(err, SwatchError::Encoding(_)));
        assert!(err.to_string().contains("thread 9 in chart 47"));

        let rows = [row(10, " ", "", (0, 0, 0))];
        assert!(to_palette(&chart("Reds", "Reds"), &rows).is_err());
    }
}
