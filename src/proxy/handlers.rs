//! HTTP request handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};

use super::server::AppState;
use crate::error::Error;
use crate::relay::{ChatRequest, ChatResponse, HealthStatus};

/// Handle GET /
pub async fn landing(State(state): State<AppState>) -> Result<Html<String>, Error> {
    let page = state.landing.render(state.relay.is_configured())?;
    Ok(Html(page))
}

/// Handle POST /chat
///
/// Bodies that fail to parse (bad JSON, unknown role, missing messages) are
/// validation errors. Other rejections keep their own status (415 for a
/// missing JSON content type, 413 for an oversized body). All of them use
/// the same `{detail}` shape as relay failures.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Rejected chat request body"
        );
        if matches!(
            rejection,
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_)
        ) {
            Error::Validation(rejection.body_text())
        } else {
            Error::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            }
        }
    })?;

    let response = state.relay.chat(request).await?;
    Ok(Json(response))
}

/// Handle GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.relay.health())
}
