// src/fetch/mod.rs

use anyhow::Result;
use reqwest::Client;
use std::{future::Future, time::Duration};

use crate::config::SourceConfig;

pub mod dir;
pub mod http;

pub use dir::DirFetcher;
pub use http::HttpFetcher;

/// Anything that can turn a resource name into its text.
pub trait Fetch {
    fn fetch_text(&self, resource: &str) -> impl Future<Output = Result<String>>;
}

/// The fetcher picked by configuration.
#[derive(Debug, Clone)]
pub enum Source {
    Http(HttpFetcher),
    Dir(DirFetcher),
}

impl Source {
    /// HTTP when a base URL is configured, otherwise the local directory.
    pub fn from_config(cfg: &SourceConfig, timeout: Duration) -> Result<Self> {
        match &cfg.base_url {
            Some(base) => {
                let client = Client::builder().timeout(timeout).gzip(true).build()?;
                Ok(Source::Http(HttpFetcher::new(client, base)?))
            }
            None => Ok(Source::Dir(DirFetcher::new(&cfg.dir))),
        }
    }
}

impl Fetch for Source {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        match self {
            Source::Http(f) => f.fetch_text(resource).await,
            Source::Dir(f) => f.fetch_text(resource).await,
        }
    }
}
