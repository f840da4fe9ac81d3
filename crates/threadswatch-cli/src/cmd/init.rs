use anyhow::Context;
use std::path::Path;
use threadswatch_core::config::Config;
use threadswatch_core::{io, paths};

const SAMPLE_CATALOG: &str = r#"# Thread catalog: brands, their charts, and each chart's threads.
# Charts or threads marked `disabled: true` are not exported.
brands:
  - name: Madeira
    charts:
      - name: Polyneon 40
        threads:
          - { code: "0345", name: Moss, red: 110, green: 90, blue: 33 }
          - { code: "0352", name: Marsh, red: 180, green: 171, blue: 93 }
          - { code: "0442", name: Tarnished Gold, red: 156, green: 132, blue: 51 }
"#;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing threadswatch in: {}", root.display());

    // 1. Write threadswatch.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .with_context(|| format!("failed to write {}", paths::CONFIG_FILE))?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 2. Sample catalog, only when the config points at the default one
    let config = Config::load(root).context("failed to load config")?;
    let catalog = root.join(paths::DEFAULT_CATALOG_FILE);
    if config.source_path(root) == catalog {
        let written = io::write_if_missing(&catalog, SAMPLE_CATALOG.as_bytes())
            .with_context(|| format!("failed to write {}", catalog.display()))?;
        let label = if written { "created:" } else { "exists: " };
        println!("  {label} {}", paths::DEFAULT_CATALOG_FILE);
    }

    println!("\nNext: edit the catalog, then run `threadswatch export`.");
    Ok(())
}
