//! Account endpoints (`/user`)

use crate::api_client::ApiClient;
use async_trait::async_trait;
use eegwa_common::api::{NewUser, PasswordUpdate, PersonalInfoUpdate, UserOut};
use eegwa_common::Result;
use std::sync::Arc;
use tracing::{debug, info};

const RESOURCE: &str = "/user";

/// Account of the signed-in user
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn current_user(&self) -> Result<UserOut>;

    /// Register a new account (no token required)
    async fn create_user(&self, user: &NewUser) -> Result<()>;

    async fn update_password(&self, update: &PasswordUpdate) -> Result<()>;

    async fn update_personal_info(&self, update: &PersonalInfoUpdate) -> Result<()>;

    /// Delete the account together with all of its recordings
    async fn delete_user(&self) -> Result<()>;
}

/// `UserApi` over HTTP
pub struct HttpUserService {
    client: Arc<ApiClient>,
}

impl HttpUserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserApi for HttpUserService {
    async fn current_user(&self) -> Result<UserOut> {
        let body = self.client.get(RESOURCE).await?;
        let user: UserOut = serde_json::from_value(body)?;
        debug!(username = %user.username, "Fetched current user");
        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<()> {
        self.client.post_json(RESOURCE, user).await?;
        info!(username = %user.username, "User created");
        Ok(())
    }

    async fn update_password(&self, update: &PasswordUpdate) -> Result<()> {
        self.client
            .patch_json(&format!("{}/password", RESOURCE), update)
            .await?;
        info!("Password updated");
        Ok(())
    }

    async fn update_personal_info(&self, update: &PersonalInfoUpdate) -> Result<()> {
        self.client
            .patch_json(&format!("{}/personal_info", RESOURCE), update)
            .await?;
        info!("Personal info updated");
        Ok(())
    }

    async fn delete_user(&self) -> Result<()> {
        self.client.delete(RESOURCE).await?;
        info!("User deleted");
        Ok(())
    }
}
