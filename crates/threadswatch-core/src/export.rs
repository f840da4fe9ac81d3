//! Batch export: every enabled chart, every configured format.
//!
//! Charts are processed one at a time and each output path is touched by
//! exactly one palette. A failure on one path is recorded and the batch moves
//! on; only a failing catalog source aborts the run.

use crate::codec::{AseCodec, Codec, Format};
use crate::config::Config;
use crate::error::Result;
use crate::paths;
use crate::source::{self, CatalogSource, Chart};
use crate::writer::{self, WriteOutcome};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Written,
    Skipped,
    WouldWrite,
    UpToDate,
    Failed,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Written => "written",
            EntryStatus::Skipped => "skipped",
            EntryStatus::WouldWrite => "would_write",
            EntryStatus::UpToDate => "up_to_date",
            EntryStatus::Failed => "failed",
        }
    }
}

impl From<WriteOutcome> for EntryStatus {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Written => EntryStatus::Written,
            WriteOutcome::Skipped => EntryStatus::Skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportEntry {
    pub chart_id: i64,
    pub palette: String,
    pub format: Format,
    pub path: PathBuf,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub entries: Vec<ExportEntry>,
}

impl ExportReport {
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(EntryStatus::Failed) > 0
    }

    /// Human-readable summary: "2 written, 5 skipped, 1 failed"
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            EntryStatus::Written,
            EntryStatus::Skipped,
            EntryStatus::WouldWrite,
            EntryStatus::UpToDate,
            EntryStatus::Failed,
        ]
        .into_iter()
        .filter_map(|s| {
            let n = self.count(s);
            (n > 0).then(|| format!("{n} {}", s.as_str().replace('_', " ")))
        })
        .collect();
        if parts.is_empty() {
            "nothing to export".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Codec for `format`, configured from `config` where the format has options.
pub fn codec_for(format: Format, config: &Config) -> Box<dyn Codec> {
    match format {
        Format::Ase => Box::new(AseCodec),
        Format::Xml => Box::new(config.xml.codec()),
    }
}

/// Export through the source named in `config`.
pub fn run(root: &Path, config: &Config, formats: &[Format], mode: Mode) -> Result<ExportReport> {
    let mut source = source::open(&config.source, root)?;
    let codecs: Vec<Box<dyn Codec>> = formats.iter().map(|f| codec_for(*f, config)).collect();
    export(source.as_mut(), &codecs, &config.output_dir(root), mode)
}

pub fn export(
    source: &mut dyn CatalogSource,
    codecs: &[Box<dyn Codec>],
    output_dir: &Path,
    mode: Mode,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for chart in source.charts()? {
        let rows = source.threads(&chart)?;
        let palette = source::to_palette(&chart, &rows);
        let stem = unique_stem(&chart, codecs, output_dir, &mut claimed);
        tracing::debug!(chart = chart.id, stem = %stem, threads = rows.len(), "exporting chart");

        for codec in codecs {
            let format = codec.format();
            let path = paths::swatch_path(output_dir, &stem, format);
            let mut entry = ExportEntry {
                chart_id: chart.id,
                palette: chart.palette_name(),
                format,
                path: path.clone(),
                status: EntryStatus::Failed,
                detail: None,
            };

            let result = palette.as_ref().map_err(|e| e.to_string()).and_then(|p| {
                let outcome = match mode {
                    Mode::Write => writer::write_if_changed(codec.as_ref(), &path, p)
                        .map(|o| (EntryStatus::from(o), None)),
                    Mode::DryRun => writer::plan(codec.as_ref(), &path, p).map(|plan| {
                        if plan.needs_rewrite() {
                            (EntryStatus::WouldWrite, Some(plan.diff.summary()))
                        } else {
                            (EntryStatus::UpToDate, None)
                        }
                    }),
                };
                outcome.map_err(|e| e.to_string())
            });

            match result {
                Ok((status, detail)) => {
                    entry.status = status;
                    entry.detail = detail;
                }
                Err(reason) => {
                    tracing::error!(path = %path.display(), %reason, "swatch export failed");
                    entry.detail = Some(reason);
                }
            }
            report.entries.push(entry);
        }
    }

    Ok(report)
}

/// The chart's file stem, suffixed with its id (then a counter) while another
/// chart in this run already claimed the same output paths.
fn unique_stem(
    chart: &Chart,
    codecs: &[Box<dyn Codec>],
    output_dir: &Path,
    claimed: &mut HashSet<PathBuf>,
) -> String {
    let base = chart.file_stem();
    let taken = |stem: &str, claimed: &HashSet<PathBuf>| {
        codecs
            .iter()
            .any(|c| claimed.contains(&paths::swatch_path(output_dir, stem, c.format())))
    };
    let mut stem = base.clone();
    let mut attempt = 1;
    while taken(&stem, claimed) {
        stem = match attempt {
            1 => format!("{base}_{}", chart.id),
            n => format!("{base}_{}_{n}", chart.id),
        };
        attempt += 1;
    }
    if stem != base {
        tracing::warn!(chart = chart.id, from = %base, to = %stem, "file name collision");
    }
    for codec in codecs {
        claimed.insert(paths::swatch_path(output_dir, &stem, codec.format()));
    }
    stem
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
