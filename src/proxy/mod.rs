//! HTTP server module.
//!
//! Serves the landing page, the `/chat` relay endpoint, `/health`, and
//! static assets.

mod handlers;
mod landing;
mod server;

pub use landing::LandingPage;
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
