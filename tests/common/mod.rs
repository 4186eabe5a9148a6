// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use calsocial_share::{config::Config, router, state::AppState};

pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// A canned upstream response.
#[derive(Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Canned {
    pub fn json(value: serde_json::Value) -> Self {
        Canned {
            status: StatusCode::OK,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn text(body: &str) -> Self {
        Canned {
            status: StatusCode::OK,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Canned {
            status,
            content_type: "text/plain; charset=utf-8",
            body: String::new(),
        }
    }
}

/// In-process stand-in for the preview API.
///
/// Paths without a canned response answer 404. Every request path is
/// recorded so tests can assert which endpoints were hit.
pub struct StubUpstream {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl StubUpstream {
    pub async fn start(responses: Vec<(&str, Canned)>) -> Self {
        let responses: Arc<HashMap<String, Canned>> = Arc::new(
            responses
                .into_iter()
                .map(|(path, canned)| (path.to_string(), canned))
                .collect(),
        );
        let hits = Arc::new(Mutex::new(Vec::new()));

        let recorded = hits.clone();
        let app = Router::new().fallback(move |uri: Uri| {
            let responses = responses.clone();
            let recorded = recorded.clone();
            async move {
                let path = uri.path().to_string();
                recorded.lock().unwrap().push(path.clone());
                match responses.get(&path) {
                    Some(c) => (
                        c.status,
                        [(header::CONTENT_TYPE, c.content_type)],
                        c.body.clone(),
                    )
                        .into_response(),
                    None => StatusCode::NOT_FOUND.into_response(),
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubUpstream {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Config pointing the preview client at `api_base_url`, defaults elsewhere.
pub fn test_config(api_base_url: &str) -> Config {
    Config {
        api_base_url: api_base_url.to_string(),
        fetch_timeout: std::time::Duration::from_secs(2),
        ..Config::default()
    }
}

/// Build the full application router against the given preview API.
pub fn create_test_app(api_base_url: &str) -> Router {
    let state = AppState::new(test_config(api_base_url)).unwrap();
    router(state)
}

/// An address nothing listens on.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

// ── HTTP helpers ─────────────────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::USER_AGENT, IPHONE_UA)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post(app: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response: Response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}
