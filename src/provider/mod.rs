//! Upstream completion providers.
//!
//! The relay talks to the LLM service only through [`CompletionProvider`],
//! so tests can substitute a fake without touching the network or the
//! process environment.

mod openai;
pub mod types;

use async_trait::async_trait;

pub use openai::OpenAiProvider;
pub use types::{Choice, Completion, CompletionRequest, Message, ReplyMessage, Role, Usage};

/// Failure raised by a provider call.
///
/// `Display` yields the raw text surfaced to HTTP callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP client could not be built.
    #[error("{0}")]
    Setup(String),

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("Error code: {status} - {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("{0}")]
    Decode(String),
}

/// A chat completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion request and wait for the full reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}
