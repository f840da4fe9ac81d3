use super::{CatalogSource, Chart, ThreadRow};
use crate::error::{Result, SwatchError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// File shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub brands: Vec<BrandEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    #[serde(default)]
    pub charts: Vec<ChartEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEntry {
    /// Defaults to the chart's 1-based position across the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default)]
    pub threads: Vec<ThreadEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadEntry {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub red: i64,
    pub green: i64,
    pub blue: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ---------------------------------------------------------------------------
// YamlCatalog
// ---------------------------------------------------------------------------

/// Thread catalog kept in a YAML file, read once at load.
#[derive(Debug)]
pub struct YamlCatalog {
    charts: Vec<Chart>,
    threads: HashMap<i64, Vec<ThreadRow>>,
}

impl YamlCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SwatchError::Source(format!("cannot read {}: {e}", path.display())))?;
        let file: CatalogFile = serde_yaml::from_str(&data)?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let mut charts = Vec::new();
        let mut threads = HashMap::new();
        let mut position = 0;
        for brand in file.brands {
            for entry in brand.charts {
                position += 1;
                let id = entry.id.unwrap_or(position);
                if entry.disabled {
                    continue;
                }
                if threads.contains_key(&id) {
                    return Err(SwatchError::Source(format!("duplicate chart id {id}")));
                }
                let rows = entry
                    .threads
                    .into_iter()
                    .enumerate()
                    .filter(|(_, t)| !t.disabled)
                    .map(|(i, t)| ThreadRow {
                        id: i as i64 + 1,
                        code: t.code,
                        name: t.name,
                        red: t.red,
                        green: t.green,
                        blue: t.blue,
                    })
                    .collect();
                threads.insert(id, rows);
                charts.push(Chart {
                    id,
                    brand: brand.name.clone(),
                    chart: entry.name,
                });
            }
        }
        Ok(Self { charts, threads })
    }
}

impl CatalogSource for YamlCatalog {
    fn charts(&mut self) -> Result<Vec<Chart>> {
        Ok(self.charts.clone())
    }

    fn threads(&mut self, chart: &Chart) -> Result<Vec<ThreadRow>> {
        Ok(self.threads.get(&chart.id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
