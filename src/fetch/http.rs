// src/fetch/http.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::Fetch;

/// Fetches resources relative to a base URL. Non-2xx responses are errors;
/// there is no retry.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("parsing base URL {}", base))?;
        // without a trailing slash `join` would replace the last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn resource_url(&self, resource: &str) -> Result<Url> {
        self.base
            .join(resource)
            .with_context(|| format!("joining {} onto {}", resource, self.base))
    }
}

impl Fetch for HttpFetcher {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        let url = self.resource_url(resource)?;
        debug!("Fetching text from {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }
}
