//! Alternative.me API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{types, AltmeError};

/// Fear & Greed endpoint, last 30 days
pub const ALTME_FNG_URL: &str = "https://api.alternative.me/fng/?limit=30&format=json";

/// Provider name carried in responses
pub const PROVIDER: &str = "alternative.me";

/// A live source of the raw Fear & Greed response
#[async_trait]
pub trait FearGreedSource: Send + Sync {
    /// Fetch and shape-check the raw response
    async fn fetch_raw(&self) -> Result<Value, AltmeError>;

    fn provider(&self) -> &str {
        PROVIDER
    }
}

/// Alternative.me API client
#[derive(Clone)]
pub struct AltmeClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl AltmeClient {
    /// Create a client with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AltmeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AltmeError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    /// Get the endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the index from the provider
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_fear_greed(&self) -> Result<Value, AltmeError> {
        debug!("Fetching Fear & Greed index");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                AltmeError::Timeout(self.timeout.as_millis() as u64)
            } else {
                AltmeError::Network(format!("Failed to fetch index: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AltmeError::Status { status, body });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| AltmeError::Parse(format!("Failed to parse index response: {}", e)))?;

        types::validate(&raw)?;
        Ok(raw)
    }
}

#[async_trait]
impl FearGreedSource for AltmeClient {
    async fn fetch_raw(&self) -> Result<Value, AltmeError> {
        self.fetch_fear_greed().await
    }
}
