pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod platform;
pub mod preview;
pub mod redirect;
pub mod render;
pub mod state;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the share router. Only `/{kind}/{id}` with a known kind renders a
/// page; every other path falls through to a plain 404.
///
/// `/metrics` is mounted by the binary because the Prometheus recorder is
/// process-global.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/:kind/:id", get(handlers::share::share_page))
        .fallback(handlers::not_found)
        .with_state(state)
}
