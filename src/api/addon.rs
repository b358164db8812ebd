//! Stremio addon protocol client
//!
//! Fetches manifests and resources from upstream addons over the fixed
//! JSON-over-HTTP path shape `/<resource>/<type>/<id>[/<extra>].json`.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Manifest, ResourceName, StreamsResponse};

/// Addon protocol error types
#[derive(Error, Debug)]
pub enum AddonError {
    #[error("resource not found (404)")]
    NotFound,

    #[error("addon returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Stremio addon client
pub struct AddonClient {
    client: reqwest::Client,
}

impl AddonClient {
    /// Create a new addon client with default settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch an addon's manifest
    pub async fn manifest(&self, base_url: &str) -> Result<Manifest, AddonError> {
        let url = format!("{}/manifest.json", trim_base(base_url));
        self.get(&url).await
    }

    /// Fetch streams for a (type, id) pair
    pub async fn streams(
        &self,
        base_url: &str,
        content_type: &str,
        id: &str,
    ) -> Result<StreamsResponse, AddonError> {
        self.resource(base_url, ResourceName::Stream, content_type, id, None)
            .await
    }

    /// Fetch any resource by (resource, type, id, extra)
    pub async fn resource<T: DeserializeOwned>(
        &self,
        base_url: &str,
        resource: ResourceName,
        content_type: &str,
        id: &str,
        extra: Option<&str>,
    ) -> Result<T, AddonError> {
        let mut url = format!(
            "{}/{}/{}/{}",
            trim_base(base_url),
            resource,
            content_type,
            urlencoding::encode(id)
        );
        if let Some(extra) = extra {
            url.push('/');
            url.push_str(extra);
        }
        url.push_str(".json");
        self.get(&url).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, AddonError> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| AddonError::InvalidResponse(format!("JSON parse error: {}", e)))
            }
            StatusCode::NOT_FOUND => Err(AddonError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AddonError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl Default for AddonClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a trailing `/manifest.json` or `/` so configured addon URLs can
/// be either form
fn trim_base(base_url: &str) -> &str {
    base_url
        .trim_end_matches('/')
        .trim_end_matches("/manifest.json")
        .trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("https://a.example"), "https://a.example");
        assert_eq!(trim_base("https://a.example/"), "https://a.example");
        assert_eq!(
            trim_base("https://a.example/manifest.json"),
            "https://a.example"
        );
    }
}
