use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::models::PreviewRequest;
use crate::platform;
use crate::redirect::ShareLinks;
use crate::render;
use crate::state::AppState;

/// Which upstream source produced the page: `api`, `fallback` or `default`.
pub const X_PREVIEW_SOURCE: &str = "x-preview-source";

/// GET /:kind/:id
///
/// Renders the share page for a circle or event. Upstream failures degrade to
/// default content and still answer 200; only an unknown kind is a 404.
pub async fn share_page(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let request = PreviewRequest::from_segments(&kind, &id)
        .ok_or_else(|| AppError::NotFound(format!("/{kind}/{id}")))?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let visitor = platform::classify(user_agent);

    let fetched = state.preview.fetch_preview(&request).await;

    tracing::info!(
        kind = %request.kind,
        id = %request.id,
        source = %fetched.source,
        platform = %visitor.platform,
        in_app_browser = visitor.in_app_browser,
        "Rendering share page"
    );

    let links = ShareLinks::new(&state.config, request.kind, &request.id);
    let html = render::render_share_page(&fetched.result, &links, &state.config);

    let cache_control =
        HeaderValue::from_str(&format!("public, max-age={}", state.config.cache_max_age))
            .map_err(|_| AppError::Internal)?;
    let source: &'static str = fetched.source.into();

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, cache_control),
            (
                HeaderName::from_static(X_PREVIEW_SOURCE),
                HeaderValue::from_static(source),
            ),
        ],
        html,
    )
        .into_response())
}
