// src/fetch/dir.rs

use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::Fetch;

/// Serves resources from a local directory, e.g. a checkout of the site.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `resource` under the root. Absolute paths and `..` are refused.
    pub fn resolve(&self, resource: &str) -> Result<PathBuf> {
        let rel = Path::new(resource);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!("resource {} escapes {}", resource, self.root.display());
        }
        Ok(self.root.join(rel))
    }
}

impl Fetch for DirFetcher {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        let path = self.resolve(resource)?;
        debug!("Reading text from {}", path.display());
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }
}
