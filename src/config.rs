// src/config.rs

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, path::PathBuf};

use crate::load::{ParseMode, SchemaKind};

/// Everything the site build needs. Every field has a default, so an empty
/// YAML document reproduces the stock two-table page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub source: SourceConfig,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub out_dir: PathBuf,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// When set, resources are fetched over HTTP relative to this URL.
    pub base_url: Option<String>,
    /// Otherwise they are read from here.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Display target the table is bound to.
    pub target: String,
    #[serde(default)]
    pub title: String,
    pub resource: String,
    pub schema: SchemaKind,
    #[serde(default)]
    pub mode: Option<ParseMode>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl DatasetConfig {
    pub fn new(target: &str, title: &str, resource: &str, schema: SchemaKind) -> Self {
        Self {
            target: target.to_string(),
            title: title.to_string(),
            resource: resource.to_string(),
            schema,
            mode: None,
            enabled: true,
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.mode.unwrap_or_else(|| self.schema.default_mode())
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.target
        } else {
            &self.title
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            dir: PathBuf::from("."),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "BGP carbon awareness".to_string(),
            source: SourceConfig::default(),
            timeout_secs: 30,
            page_size: 10,
            out_dir: PathBuf::from("site"),
            datasets: vec![
                DatasetConfig::new(
                    "as-table",
                    "AS CO₂ intensity",
                    "as_co2_final_filtered_sorted.csv",
                    SchemaKind::AsIntensity,
                ),
                DatasetConfig::new(
                    "link-table",
                    "AS link emissions",
                    "enriched_as_links.csv",
                    SchemaKind::LinkEnriched,
                ),
            ],
        }
    }
}

impl SiteConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // serde_yaml rejects an empty document; treat it as "all defaults"
        let cfg: SiteConfig = if text.trim().is_empty() {
            SiteConfig::default()
        } else {
            serde_yaml::from_str(text).context("parsing site config")?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.page_size > 0, "page_size must be positive");
        let mut seen = HashSet::new();
        for ds in &self.datasets {
            ensure!(!ds.target.trim().is_empty(), "dataset with empty target");
            ensure!(
                !ds.resource.trim().is_empty(),
                "dataset {} has no resource",
                ds.target
            );
            ensure!(
                seen.insert(ds.target.as_str()),
                "target {} is configured twice",
                ds.target
            );
        }
        Ok(())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &DatasetConfig> {
        self.datasets.iter().filter(|d| d.enabled)
    }
}
