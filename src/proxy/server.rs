//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use super::landing::LandingPage;
use crate::config::Config;
use crate::relay::RelayHandler;

/// Response header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state. Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayHandler>,
    pub landing: Arc<LandingPage>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, relay: RelayHandler) -> crate::Result<Self> {
        Ok(Self {
            relay: Arc::new(relay),
            landing: Arc::new(LandingPage::new()?),
            config: Arc::new(config),
        })
    }
}

/// Correlation ID assigned to every incoming request.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.0.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.web.static_dir);

    Router::new()
        .route("/", get(handlers::landing))
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .nest_service("/static", static_dir)
        // State and middleware
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.0.to_string())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(middleware::from_fn(assign_request_id))
}

/// Run the HTTP server.
pub async fn run_server(config: Config, listen: Option<String>) -> anyhow::Result<()> {
    let listen_addr = listen.unwrap_or_else(|| config.server.listen.clone());

    let relay = RelayHandler::from_config(&config.provider)?;
    if !relay.is_configured() {
        tracing::warn!(
            "No upstream credential configured - /chat will reject all requests until restart"
        );
    }

    let state = AppState::new(config, relay)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting arkchat server");

    axum::serve(listener, app).await?;

    Ok(())
}
