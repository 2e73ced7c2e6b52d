use crate::errors::ServiceError;
use crate::services::collaborators::HttpFetcher;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// `reqwest` backed fetcher; non-success statuses are transport errors
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to construct reqwest client for remote file mirroring")?;

        Ok(Self::with_client(client))
    }

    /// Build a fetcher from an existing client (useful for testing).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Bytes, ServiceError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "fetched remote file");
        Ok(body)
    }
}
