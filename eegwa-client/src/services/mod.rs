//! Resource services wrapping the REST endpoints
//!
//! Each backend resource is reached through a trait so stores can be driven by
//! in-memory fakes in tests and by the HTTP implementations in production.

pub mod auth_service;
pub mod classification_service;
pub mod recording_service;
pub mod user_service;

pub use auth_service::{AuthApi, HttpAuthService};
pub use classification_service::{ClassificationApi, HttpClassificationService};
pub use recording_service::{HttpRecordingService, RecordingApi, SortOrder};
pub use user_service::{HttpUserService, UserApi};

use crate::api_client::ApiClient;
use std::sync::Arc;

/// One implementation of every service, as handed to a session
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthApi>,
    pub classification: Arc<dyn ClassificationApi>,
    pub recording: Arc<dyn RecordingApi>,
    pub user: Arc<dyn UserApi>,
}

impl Services {
    /// HTTP implementations sharing one client
    pub fn http(client: Arc<ApiClient>) -> Self {
        Self {
            auth: Arc::new(HttpAuthService::new(client.clone())),
            classification: Arc::new(HttpClassificationService::new(client.clone())),
            recording: Arc::new(HttpRecordingService::new(client.clone())),
            user: Arc::new(HttpUserService::new(client)),
        }
    }
}
