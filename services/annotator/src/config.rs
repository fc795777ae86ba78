//! Annotator configuration.
//!
//! Settings come from, in increasing priority: built-in defaults, an
//! optional YAML file, environment variables and command-line flags.
//!
//! ```yaml
//! table: data/processed/annotations_SS.txt
//! dataset_dir: data/processed/dataset
//! window_size: 3.0
//! catalog:
//!   medicanes: [1328, 1461]
//!   excluded: [1466]
//! ```
//!
//! Catalog lists left out of the file keep their built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ring_common::Catalog;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_TABLE: &str = "data/processed/annotations_SS.txt";
pub const DEFAULT_DATASET_DIR: &str = "data/processed/dataset";
pub const DEFAULT_PREVIEW: &str = "annotation_preview.png";
pub const DEFAULT_WINDOW_SIZE: f64 = 3.0;

/// Prefix of the table written at the end of a session.
pub const OUTPUT_PREFIX: &str = "new_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Event table to review
    pub table: PathBuf,
    /// Directory holding the scans named in the table
    pub dataset_dir: PathBuf,
    /// Half-width of the plotted area in degrees
    pub window_size: f64,
    /// Where the current scan's plot is written
    pub preview: PathBuf,
    pub catalog: Catalog,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            table: PathBuf::from(DEFAULT_TABLE),
            dataset_dir: PathBuf::from(DEFAULT_DATASET_DIR),
            window_size: DEFAULT_WINDOW_SIZE,
            preview: PathBuf::from(DEFAULT_PREVIEW),
            catalog: Catalog::default(),
        }
    }
}

impl AnnotatorConfig {
    /// Parse a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given and present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => {
                warn!(path = %p.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size.is_nan() || self.window_size <= 0.0 {
            anyhow::bail!("window_size must be positive, got {}", self.window_size);
        }
        Ok(())
    }

    /// `new_<table file name>` inside the dataset directory.
    pub fn output_path(&self) -> PathBuf {
        let name = self
            .table
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "annotations.txt".to_string());
        self.dataset_dir.join(format!("{}{}", OUTPUT_PREFIX, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.window_size, 3.0);
        assert!(config.catalog.is_medicane(1328));
        assert_eq!(
            config.output_path(),
            PathBuf::from("data/processed/dataset/new_annotations_SS.txt")
        );
    }

    #[test]
    fn test_partial_yaml() {
        let config = AnnotatorConfig::from_yaml(
            "window_size: 2.5\ncatalog:\n  medicanes: [7]\n",
        )
        .unwrap();
        assert_eq!(config.window_size, 2.5);
        assert!(config.catalog.is_medicane(7));
        assert!(!config.catalog.is_medicane(1328));
        // Lists not given keep their defaults.
        assert!(config.catalog.is_blocked(848));
        assert_eq!(config.table, PathBuf::from(DEFAULT_TABLE));
    }

    #[test]
    fn test_rejects_bad_window() {
        assert!(AnnotatorConfig::from_yaml("window_size: 0").is_err());
        assert!(AnnotatorConfig::from_yaml("window_size: [1]").is_err());

        let config = AnnotatorConfig {
            window_size: f64::NAN,
            ..AnnotatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AnnotatorConfig::load(Some(Path::new("/nonexistent/annotator.yaml"))).unwrap();
        assert_eq!(config, AnnotatorConfig::default());
    }
}
