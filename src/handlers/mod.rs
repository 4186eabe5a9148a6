pub mod share;

use axum::{http::StatusCode, http::Uri, Json};
use serde_json::{json, Value};

use crate::error::AppError;

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "calsocial-share",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Router fallback: any path that is not `/{kind}/{id}` or a service route.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
