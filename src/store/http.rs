//! Generic JSON-over-HTTP store client
//!
//! Talks to any endpoint exposing the uniform store API; backend-specific
//! request formatting lives behind that endpoint, not here. Responses
//! arrive in a `{"data": …}` envelope.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{
    AddMagnetData, AddMagnetParams, CheckMagnetData, CheckMagnetParams, GenerateLinkData,
    GenerateLinkParams, GetMagnetData, GetMagnetParams, GetUserParams, ListMagnetsData,
    ListMagnetsParams, RemoveMagnetData, RemoveMagnetParams, Store, StoreError, StoreName, User,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Store client over the uniform JSON API
pub struct HttpStore {
    name: StoreName,
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(name: StoreName, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        api_key: &str,
        client_ip: Option<&str>,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Accept", "application/json")
            .header("X-Store-Name", self.name.to_string())
            .query(query);
        if let Some(ip) = client_ip {
            request = request.header("X-Client-Ip", ip);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                let envelope: Envelope<T> = serde_json::from_str(&body)
                    .map_err(|e| StoreError::InvalidResponse(format!("JSON parse error: {}", e)))?;
                Ok(envelope.data)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Upstream {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl Store for HttpStore {
    fn name(&self) -> StoreName {
        self.name
    }

    async fn get_user(&self, params: &GetUserParams) -> Result<User, StoreError> {
        self.request(Method::GET, "/v0/store/user", &params.api_key, None, &[], None)
            .await
    }

    async fn check_magnet(
        &self,
        params: &CheckMagnetParams,
    ) -> Result<CheckMagnetData, StoreError> {
        let mut query = vec![("magnet", params.magnets.join(","))];
        if let Some(sid) = &params.sid {
            query.push(("sid", sid.clone()));
        }
        self.request(
            Method::GET,
            "/v0/store/magnets/check",
            &params.api_key,
            params.client_ip.as_deref(),
            &query,
            None,
        )
        .await
    }

    async fn add_magnet(&self, params: &AddMagnetParams) -> Result<AddMagnetData, StoreError> {
        self.request(
            Method::POST,
            "/v0/store/magnets",
            &params.api_key,
            params.client_ip.as_deref(),
            &[],
            Some(serde_json::json!({ "magnet": params.magnet })),
        )
        .await
    }

    async fn get_magnet(&self, params: &GetMagnetParams) -> Result<GetMagnetData, StoreError> {
        let path = format!("/v0/store/magnets/{}", urlencoding::encode(&params.id));
        self.request(
            Method::GET,
            &path,
            &params.api_key,
            params.client_ip.as_deref(),
            &[],
            None,
        )
        .await
    }

    async fn list_magnets(
        &self,
        params: &ListMagnetsParams,
    ) -> Result<ListMagnetsData, StoreError> {
        self.request(
            Method::GET,
            "/v0/store/magnets",
            &params.api_key,
            None,
            &[],
            None,
        )
        .await
    }

    async fn remove_magnet(
        &self,
        params: &RemoveMagnetParams,
    ) -> Result<RemoveMagnetData, StoreError> {
        let path = format!("/v0/store/magnets/{}", urlencoding::encode(&params.id));
        self.request(Method::DELETE, &path, &params.api_key, None, &[], None)
            .await
    }

    async fn generate_link(
        &self,
        params: &GenerateLinkParams,
    ) -> Result<GenerateLinkData, StoreError> {
        self.request(
            Method::POST,
            "/v0/store/link/generate",
            &params.api_key,
            params.client_ip.as_deref(),
            &[],
            Some(serde_json::json!({ "link": params.link })),
        )
        .await
    }
}
