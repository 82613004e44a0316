//! REST transport shared by all services
//!
//! One `reqwest::Client` per session with a fixed overall timeout. Every call returns the
//! decoded JSON body; failures are mapped onto the common error type:
//! - no response (connect, DNS, timeout) → `Error::Transport`
//! - non-2xx status → `Error::Status` with the body text as message
//! - undecodable body → `Error::Parse`

use eegwa_common::config::ClientConfig;
use eegwa_common::{Error, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("eegwa-client/", env!("CARGO_PKG_VERSION"));

/// Query string pairs
pub type Query<'a> = &'a [(&'a str, String)];

/// Request body
enum Payload<'a> {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(&'a [(&'a str, &'a str)]),
}

/// HTTP client bound to one backend base URL
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Build a client from resolved configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(config.access_token.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach a bearer token to every subsequent request
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    /// Stop sending the `Authorization` header
    pub async fn clear_token(&self) {
        *self.access_token.write().await = None;
    }

    pub async fn has_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, &[], Payload::Empty).await
    }

    pub async fn get_with_query(&self, path: &str, query: Query<'_>) -> Result<Value> {
        self.request(Method::GET, path, query, Payload::Empty).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &[], Payload::Json(body)).await
    }

    /// POST an url-encoded form (OAuth2 password flow)
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value> {
        self.request(Method::POST, path, &[], Payload::Form(form)).await
    }

    /// PATCH without a body (parameters in the query string)
    pub async fn patch_query(&self, path: &str, query: Query<'_>) -> Result<Value> {
        self.request(Method::PATCH, path, query, Payload::Empty).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, path, &[], Payload::Json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, &[], Payload::Empty).await
    }

    pub async fn delete_with_query(&self, path: &str, query: Query<'_>) -> Result<Value> {
        self.request(Method::DELETE, path, query, Payload::Empty).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        payload: Payload<'_>,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending API request");

        let mut builder = self.http_client.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Form(form) => builder.form(form),
        };
        if let Some(token) = self.access_token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(url = %url, "API request timed out");
                Error::Transport(format!("Request to {} timed out", url))
            } else {
                warn!(url = %url, error = %e, "API request failed");
                Error::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(method = %method, url = %url, status = status.as_u16(), "API returned error status");
            return Err(Error::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::Parse(format!("{} {}: {}", method, url, e)))
    }
}
