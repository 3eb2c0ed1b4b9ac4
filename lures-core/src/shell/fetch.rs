use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt::Debug;

/// Retrieves asset bodies for the shell cache worker. A seam so the
/// worker's lifecycle can be driven without a network.
#[async_trait]
pub trait AssetFetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Fetcher backed by a shared reqwest client. Non-2xx responses are
/// failures.
#[derive(Debug, Clone, Default)]
pub struct HttpAssetFetcher {
    http: Client,
}

impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to request asset: {url}"))?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Asset request for {url} failed with status {status}"));
        }

        let body = res
            .bytes()
            .await
            .with_context(|| format!("Failed to read asset body: {url}"))?;

        Ok(body.to_vec())
    }
}
