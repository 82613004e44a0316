//! Sign-in endpoint (`/auth`)

use crate::api_client::ApiClient;
use async_trait::async_trait;
use eegwa_common::api::UserToken;
use eegwa_common::Result;
use std::sync::Arc;
use tracing::info;

const RESOURCE: &str = "/auth";

/// Exchange of credentials for a bearer token
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<UserToken>;
}

/// `AuthApi` over HTTP
pub struct HttpAuthService {
    client: Arc<ApiClient>,
}

impl HttpAuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for HttpAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<UserToken> {
        let body = self
            .client
            .post_form(
                &format!("{}/token", RESOURCE),
                &[("username", username), ("password", password)],
            )
            .await?;
        let token: UserToken = serde_json::from_value(body)?;
        info!(username = %token.username, "Signed in");
        Ok(token)
    }
}
