// src/catalog/client.rs
use crate::utils::error::CatalogError;
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use std::time::Duration;

const CATALOG_USER_AGENT: &str = concat!("catalog_scraper/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into page markup.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError>;
}

/// Fetcher backed by a single reusable reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher. With no timeout the transport defaults apply;
    /// `delay` is slept before every request.
    pub fn new(timeout: Option<Duration>, delay: Duration) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder().user_agent(CATALOG_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, delay })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!("GET {}", url);
        let response = self.client.get(url)
            .header(header::ACCEPT, "text/html,*/*")
            .send()
            .await?; // Propagates reqwest::Error as CatalogError::Network

        check_status(response.status(), url)?;

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Maps a non-success status onto the matching error.
fn check_status(status: StatusCode, url: &str) -> Result<(), CatalogError> {
    if status.is_success() {
        return Ok(());
    }
    tracing::error!("HTTP error status: {} for URL: {}", status, url);
    if status == StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(url.to_string()));
    }
    Err(CatalogError::Http { status, url: url.to_string() })
}
