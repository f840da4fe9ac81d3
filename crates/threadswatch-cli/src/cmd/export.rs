use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use threadswatch_core::codec::Format;
use threadswatch_core::config::Config;
use threadswatch_core::export::{self, EntryStatus, Mode};

pub fn run(root: &Path, format: Option<&str>, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let formats: Vec<Format> = match format {
        Some(f) => vec![f.parse()?],
        None => {
            let mut formats = config.output.formats.clone();
            formats.sort();
            formats.dedup();
            formats
        }
    };
    if formats.is_empty() {
        anyhow::bail!("no output formats configured; set output.formats or pass --format");
    }

    let mode = if dry_run { Mode::DryRun } else { Mode::Write };
    let report = export::run(root, &config, &formats, mode).context("export failed")?;

    if json {
        print_json(&report)?;
    } else if report.entries.is_empty() {
        println!("No enabled charts in {}.", config.source_path(root).display());
    } else {
        let rows = report
            .entries
            .iter()
            .map(|e| {
                let shown = e.path.strip_prefix(root).unwrap_or(&e.path);
                vec![
                    e.status.as_str().to_string(),
                    e.format.to_string(),
                    shown.display().to_string(),
                    e.detail.clone().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["STATUS", "FORMAT", "PATH", "DETAIL"], rows);
        println!("\n{}", report.summary());
    }

    let failed = report.count(EntryStatus::Failed);
    if failed > 0 {
        anyhow::bail!("{failed} swatch file(s) failed to export");
    }
    Ok(())
}
