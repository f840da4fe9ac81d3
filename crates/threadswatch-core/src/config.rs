use crate::codec::{Format, XmlCodec};
use crate::error::{Result, SwatchError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SourceConfig
// ---------------------------------------------------------------------------

/// Where chart and thread rows come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// SQLite database with `thread_brands`, `thread_charts`, `thread_cones`.
    Sqlite { path: PathBuf },
    /// YAML catalog file.
    Catalog { path: PathBuf },
}

impl SourceConfig {
    pub fn path(&self) -> &Path {
        match self {
            SourceConfig::Sqlite { path } | SourceConfig::Catalog { path } => path,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Catalog {
            path: PathBuf::from(paths::DEFAULT_CATALOG_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_formats")]
    pub formats: Vec<Format>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_OUTPUT_DIR)
}

fn default_formats() -> Vec<Format> {
    Format::all().to_vec()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            formats: default_formats(),
        }
    }
}

// ---------------------------------------------------------------------------
// XmlConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XmlConfig {
    #[serde(default = "default_locked")]
    pub locked: bool,
    #[serde(default = "default_comments")]
    pub comments: Vec<String>,
}

fn default_locked() -> bool {
    true
}

/// Author, credit and disclaimer lines written above every XML palette.
fn default_comments() -> Vec<String> {
    [
        "Created with threadswatch",
        "Provided for free.",
        "Disclaimer: The following XML file may contain names that are registered trademarks or copyrighted material owned by their respective owners.",
        "The use of such names is for descriptive purposes only. All rights to these names are owned by their respective owners.",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            locked: default_locked(),
            comments: default_comments(),
        }
    }
}

impl XmlConfig {
    pub fn codec(&self) -> XmlCodec {
        XmlCodec {
            locked: self.locked,
            comments: self.comments.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub xml: XmlConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            xml: XmlConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SwatchError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn source_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, self.source.path())
    }

    pub fn output_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.output.dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message });
        };

        if self.version != 1 {
            push(
                WarnLevel::Warning,
                format!("unknown config version {} (expected 1)", self.version),
            );
        }

        let source = self.source_path(root);
        if !source.is_file() {
            push(
                WarnLevel::Error,
                format!("source file '{}' does not exist", source.display()),
            );
        }

        if self.output.formats.is_empty() {
            push(
                WarnLevel::Error,
                "output.formats is empty: nothing would be exported".to_string(),
            );
        }
        let mut seen = BTreeSet::new();
        for format in &self.output.formats {
            if !seen.insert(*format) {
                push(
                    WarnLevel::Warning,
                    format!("format '{format}' is listed more than once in output.formats"),
                );
            }
        }

        let output = self.output_dir(root);
        if output.is_file() {
            push(
                WarnLevel::Error,
                format!("output dir '{}' is a file", output.display()),
            );
        }

        for comment in &self.xml.comments {
            if comment.contains("--") {
                push(
                    WarnLevel::Warning,
                    format!("xml comment '{comment}' contains '--', which will be written as '- -'"),
                );
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.source, SourceConfig::default());
        assert_eq!(parsed.output.formats, vec![Format::Ase, Format::Xml]);
    }

    #[test]
    fn source_yaml_tagged() {
        let yaml = "source:\n  type: sqlite\n  path: threads.db\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.source,
            SourceConfig::Sqlite {
                path: PathBuf::from("threads.db")
            }
        );
        assert_eq!(cfg.output.dir, PathBuf::from("swatches"));
        assert!(cfg.xml.locked);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(SwatchError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.output.formats = vec![Format::Xml];
        cfg.xml.comments = vec!["Provided for free.".to_string()];
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.output.formats, vec![Format::Xml]);
        assert_eq!(loaded.xml.comments, vec!["Provided for free."]);
    }

    #[test]
    fn validate_valid_config_no_warnings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("catalog.yaml"), "brands: []\n").unwrap();
        assert!(Config::default().validate(dir.path()).is_empty());
    }

    #[test]
    fn validate_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let warnings = Config::default().validate(dir.path());
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("does not exist")));
    }

    #[test]
    fn validate_formats() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("catalog.yaml"), "brands: []\n").unwrap();

        let mut cfg = Config::default();
        cfg.output.formats = vec![];
        assert!(cfg
            .validate(dir.path())
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("empty")));

        cfg.output.formats = vec![Format::Ase, Format::Ase];
        assert!(cfg
            .validate(dir.path())
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("more than once")));
    }

    #[test]
    fn default_xml_header_carries_credit_and_disclaimer() {
        let xml = XmlConfig::default();
        assert_eq!(xml.comments.len(), 4);
        assert!(xml.comments[2].starts_with("Disclaimer:"));

        // an explicit empty list turns the header off
        let off: XmlConfig = serde_yaml::from_str("comments: []\n").unwrap();
        assert!(off.comments.is_empty());
        let unset: XmlConfig = serde_yaml::from_str("locked: false\n").unwrap();
        assert_eq!(unset.comments, default_comments());
    }

    #[test]
    fn validate_comment_dashes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("catalog.yaml"), "brands: []\n").unwrap();
        let mut cfg = Config::default();
        cfg.xml.comments = vec!["a -- b".to_string()];
        assert_eq!(cfg.validate(dir.path()).len(), 1);
    }
}
