//! One signed-in session
//!
//! Owns the transport, the services and every store. Stores reach each other only
//! through the references handed to them here.

use crate::api_client::ApiClient;
use crate::services::{AuthApi, ClassificationApi, Services};
use crate::store::{
    AnalysisStore, ClassificationStateStore, PlotStore, RecordingsListStore, UserAccountStore,
};
use eegwa_common::api::UserToken;
use eegwa_common::config::ClientConfig;
use eegwa_common::{Error, FailureRoute, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub struct Session {
    client: Arc<ApiClient>,
    auth_api: Arc<dyn AuthApi>,
    classification_api: Arc<dyn ClassificationApi>,
    /// Username of the last successful login
    signed_in: RwLock<Option<String>>,
    pub classification: Arc<ClassificationStateStore>,
    pub analysis: AnalysisStore,
    pub recordings: RecordingsListStore,
    pub plot: PlotStore,
    pub account: UserAccountStore,
}

impl Session {
    /// Session talking to the configured backend over HTTP
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Arc::new(ApiClient::new(config)?);
        let services = Services::http(client.clone());
        Ok(Self::with_services(client, services))
    }

    /// Session over arbitrary service implementations
    pub fn with_services(client: Arc<ApiClient>, services: Services) -> Self {
        let classification = Arc::new(ClassificationStateStore::new(
            services.classification.clone(),
        ));
        Self {
            client,
            auth_api: services.auth,
            classification_api: services.classification,
            signed_in: RwLock::new(None),
            analysis: AnalysisStore::new(services.recording.clone(), classification.clone()),
            recordings: RecordingsListStore::new(services.recording.clone()),
            plot: PlotStore::new(services.recording),
            account: UserAccountStore::new(services.user),
            classification,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Direct access for calls that do not touch store state (filtered reports)
    pub fn classification_api(&self) -> &dyn ClassificationApi {
        self.classification_api.as_ref()
    }

    /// Exchange credentials for a token and use it for every following call.
    /// A rejected login leaves the session signed out.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserToken> {
        match self.auth_api.login(username, password).await {
            Ok(token) => {
                self.client.set_token(token.access_token.clone()).await;
                *self.signed_in.write().await = Some(token.username.clone());
                Ok(token)
            }
            Err(e) => {
                *self.signed_in.write().await = None;
                Err(e)
            }
        }
    }

    /// True once `login` succeeded, or when a token came from configuration
    pub async fn logged_in(&self) -> bool {
        self.signed_in.read().await.is_some() || self.client.has_token().await
    }

    /// Name given at login, empty when unknown
    pub async fn logged_username(&self) -> String {
        self.signed_in.read().await.clone().unwrap_or_default()
    }

    /// Leave the analysis view of the current recording
    pub async fn leave_recording(&self) {
        self.analysis.clear().await;
        self.plot.clear().await;
        self.classification.reset().await;
    }

    /// Forget the token and everything loaded under it
    pub async fn logout(&self) {
        self.client.clear_token().await;
        *self.signed_in.write().await = None;
        self.account.clear().await;
        self.recordings.clear().await;
        self.leave_recording().await;
        info!("Session cleared");
    }

    /// Delete the account, then sign out
    pub async fn delete_account(&self) -> Result<()> {
        self.account.delete_account().await?;
        self.logout().await;
        Ok(())
    }

    /// Route for a failed call. A rejected token (401) also signs the session out.
    pub async fn handle_failure(&self, err: &Error) -> Option<FailureRoute> {
        let route = err.failure_route();
        if route == Some(FailureRoute::SignIn) {
            warn!("Token rejected, signing out");
            self.logout().await;
        }
        route
    }
}
