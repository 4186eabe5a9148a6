//! Client for the calsocial preview API.
//!
//! Every fetch is best-effort: the JSON preview is tried first, then the
//! plain-text title/name endpoint, and whatever fails leaves defaults in place.

use reqwest::header::ACCEPT;
use reqwest::Client as ReqwestClient;
use thiserror::Error;

use crate::config::Config;
use crate::models::{EntityKind, PreviewPayload, PreviewRequest, PreviewResult, PreviewSource};

pub const USER_AGENT: &str = concat!("calsocial-share/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed preview body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("preview body is not a JSON object")]
    UnexpectedShape,
}

/// A preview plus where it came from.
#[derive(Debug, Clone)]
pub struct FetchedPreview {
    pub result: PreviewResult,
    pub source: PreviewSource,
}

#[derive(Clone)]
pub struct PreviewClient {
    http: ReqwestClient,
    api_base_url: String,
    default_image_url: String,
}

impl PreviewClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = ReqwestClient::builder()
            .timeout(config.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(PreviewClient {
            http,
            api_base_url: config.api_base_url.clone(),
            default_image_url: config.default_image_url.clone(),
        })
    }

    fn entity_url(&self, kind: EntityKind, id: &str, endpoint: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_base_url,
            kind.profile().api_collection,
            urlencoding::encode(id),
            endpoint
        )
    }

    /// `{api}/circles/uid/{id}/preview` or `{api}/events/{id}/preview`.
    pub fn preview_url(&self, kind: EntityKind, id: &str) -> String {
        self.entity_url(kind, id, "preview")
    }

    /// `{api}/circles/uid/{id}/name` or `{api}/events/{id}/title`.
    pub fn fallback_url(&self, kind: EntityKind, id: &str) -> String {
        self.entity_url(kind, id, kind.profile().fallback_endpoint)
    }

    /// Fetch display data for a share page. Never fails; see module docs.
    pub async fn fetch_preview(&self, request: &PreviewRequest) -> FetchedPreview {
        let PreviewRequest { kind, id } = request;
        let mut result = PreviewResult::defaults(*kind, &self.default_image_url);

        match self.fetch_json(*kind, id).await {
            Ok(payload) => {
                payload.apply_to(&mut result);
                return FetchedPreview {
                    result,
                    source: PreviewSource::Api,
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, id = %id, "Preview fetch failed, trying fallback endpoint");
            }
        }

        let source = match self.fetch_text(*kind, id).await {
            Ok(body) if result.apply_fallback_title(&body) => PreviewSource::Fallback,
            Ok(_) => {
                tracing::warn!(kind = %kind, id = %id, "Fallback endpoint returned an empty title");
                PreviewSource::Default
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, id = %id, "Fallback fetch failed, serving defaults");
                PreviewSource::Default
            }
        };

        FetchedPreview { result, source }
    }

    async fn fetch_json(&self, kind: EntityKind, id: &str) -> Result<PreviewPayload, FetchError> {
        let response = self
            .http
            .get(self.preview_url(kind, id))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(FetchError::Decode)?;

        PreviewPayload::from_value(kind, value).ok_or(FetchError::UnexpectedShape)
    }

    async fn fetch_text(&self, kind: EntityKind, id: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(self.fallback_url(kind, id))
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}
