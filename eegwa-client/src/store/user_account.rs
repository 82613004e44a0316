//! Account of the signed-in user

use crate::services::UserApi;
use eegwa_common::api::{NewUser, PasswordUpdate, PersonalInfoUpdate, UserOut};
use eegwa_common::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct UserAccountStore {
    api: Arc<dyn UserApi>,
    current: RwLock<Option<UserOut>>,
}

impl UserAccountStore {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            api,
            current: RwLock::new(None),
        }
    }

    pub async fn fetch_current(&self) -> Result<UserOut> {
        let user = self.api.current_user().await?;
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    /// Register an account; the session stays signed out until `login`
    pub async fn create_user(&self, user: NewUser) -> Result<()> {
        self.api.create_user(&user).await
    }

    /// Send the non-empty fields, then overwrite only those locally
    pub async fn update_personal_info(&self, update: PersonalInfoUpdate) -> Result<()> {
        let update = update.non_empty();
        self.api.update_personal_info(&update).await?;

        if let Some(current) = self.current.write().await.as_mut() {
            if let Some(first_name) = update.first_name {
                current.first_name = first_name;
            }
            if let Some(last_name) = update.last_name {
                current.last_name = last_name;
            }
            if let Some(email) = update.email {
                current.email = email;
            }
        }
        Ok(())
    }

    pub async fn update_password(&self, update: PasswordUpdate) -> Result<()> {
        self.api.update_password(&update).await
    }

    /// Delete the account on the server and forget it locally
    pub async fn delete_account(&self) -> Result<()> {
        self.api.delete_user().await?;
        *self.current.write().await = None;
        info!("Account removed");
        Ok(())
    }

    pub async fn current(&self) -> Option<UserOut> {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
