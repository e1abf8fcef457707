//! OpenAI Chat Completions client.

use async_trait::async_trait;
use axum::http::header;
use reqwest::Client;
use std::time::Duration;

use super::types::{Completion, CompletionRequest};
use super::{CompletionProvider, ProviderError};
use crate::config::{ApiKey, ProviderConfig};

const COMPLETIONS_PATH: &str = "/chat/completions";

/// HTTP client for `POST {base_url}/chat/completions`.
///
/// No timeout is applied unless one is configured.
pub struct OpenAiProvider {
    client: Client,
    url: String,
    api_key: ApiKey,
}

impl OpenAiProvider {
    pub fn new(
        base_url: &str,
        api_key: ApiKey,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key,
        })
    }

    /// Build a provider from config. Returns `None` when no credential is set.
    pub fn from_config(config: &ProviderConfig) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        Self::new(
            &config.base_url,
            api_key,
            config.timeout(),
            config.connect_timeout(),
        )
        .map(Some)
    }

    /// Full completions endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %self.url, "Failed to reach provider");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<failed to read error body: {}>", e),
            };
            tracing::error!(status = %status, body = %body, "Provider returned error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Completion>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse provider response");
            ProviderError::Decode(format!("Failed to parse provider response: {}", e))
        })
    }
}
