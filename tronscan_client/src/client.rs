use crate::error::TronscanError;
use async_trait::async_trait;
use config_manager::ExplorerConfig;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Minimal JSON-over-HTTP primitive the history pipeline is written against
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// GET `path` relative to the explorer base URL and return the parsed JSON body
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TronscanError>;
}

/// Tronscan API client
#[derive(Debug, Clone)]
pub struct TronscanClient {
    client: Client,
    base_url: Url,
}

impl TronscanClient {
    /// Create a new Tronscan client from explorer configuration
    pub fn new(config: &ExplorerConfig) -> Result<Self, TronscanError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);

        if let Some(timeout) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(&base)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ExplorerApi for TronscanClient {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TronscanError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        debug!("🌐 GET {} {:?}", url, query);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("❌ Tronscan API error - Status: {}, Body: {}", status, text);

            return Err(match status.as_u16() {
                429 => TronscanError::RateLimit,
                code => TronscanError::ApiError {
                    status: code,
                    message: text,
                },
            });
        }

        let response_text = response.text().await?;
        debug!("📨 {} returned {} bytes", url, response_text.len());

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                "❌ Failed to parse Tronscan response: {} - sample: {}",
                e,
                response_text.chars().take(500).collect::<String>()
            );
            TronscanError::JsonError(e)
        })
    }
}
