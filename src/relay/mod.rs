//! The relay handler.
//!
//! Takes a caller's chat history, prepends the ARK system prompt, makes
//! exactly one upstream completion call and shapes the result.

pub mod prompt;
pub mod types;

use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::config::{ProviderConfig, CREDENTIAL_ENV_VAR};
use crate::error::{Error, Result};
use crate::provider::{CompletionProvider, CompletionRequest, OpenAiProvider};

pub use prompt::{build_messages, SYSTEM_PROMPT};
pub use types::{ChatMessage, ChatRequest, ChatResponse, HealthStatus};

/// Relays chat requests to the upstream provider.
///
/// Without a provider the handler is unconfigured and every chat call fails
/// with [`Error::Configuration`]. The state is fixed at construction.
#[derive(Clone)]
pub struct RelayHandler {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl RelayHandler {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::new(Some(provider))
    }

    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    /// Build the handler from provider config: an OpenAI client when a
    /// credential is present, unconfigured otherwise.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let provider = OpenAiProvider::from_config(config)
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(
            provider.map(|p| Arc::new(p) as Arc<dyn CompletionProvider>),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            credential_configured: self.is_configured(),
        }
    }

    /// Relay one conversation upstream.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let Some(provider) = &self.provider else {
            tracing::warn!("Rejecting chat request: credential not configured");
            return Err(Error::Configuration(format!(
                "{} no configurada en variables de entorno.",
                CREDENTIAL_ENV_VAR
            )));
        };

        let upstream = CompletionRequest {
            model: request.model().to_string(),
            messages: build_messages(&request.messages),
            temperature: request.temperature(),
        };

        tracing::info!(
            model = %upstream.model,
            temperature = upstream.temperature,
            course = %request.course(),
            messages = request.messages.len(),
            "Relaying chat request"
        );

        let completion = provider.complete(&upstream).await.map_err(|e| {
            tracing::error!(error = %e, model = %upstream.model, "Upstream completion failed");
            Error::Upstream(e.to_string())
        })?;

        let Some(choice) = completion.choices.into_iter().next() else {
            tracing::error!(model = %upstream.model, "Provider returned no choices");
            return Err(Error::Upstream(
                "Provider response contained no choices".to_string(),
            ));
        };

        if let Some(usage) = &completion.usage {
            tracing::info!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                total_tokens = ?usage.total_tokens,
                "Chat reply received"
            );
        }

        Ok(ChatResponse {
            ok: true,
            reply: choice.message.content,
            usage: completion.usage,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        })
    }
}
