//! Request and response bodies of the relay endpoints.

use serde::{Deserialize, Serialize};

use crate::provider::{Message, Usage};

/// Messages in a chat request use the upstream message shape.
pub type ChatMessage = Message;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_COURSE: &str = "KIN508";

/// Body of `POST /chat`.
///
/// Omitted or `null` optional fields fall back to their defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Course tag reserved for per-course prompts; currently ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            course: None,
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn course(&self) -> &str {
        self.course.as_deref().unwrap_or(DEFAULT_COURSE)
    }
}

/// Body of a successful `POST /chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub ok: bool,
    pub reply: Option<String>,
    pub usage: Option<Usage>,
    /// UTC ISO-8601 timestamp, e.g. `2026-10-17T09:30:00.123456Z`
    pub ts: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(rename = "env_openai")]
    pub credential_configured: bool,
}
