//! eegwa-client library interface
//!
//! Session-scoped client for the EEG Web Assistant backend: REST transport, resource
//! services, display view models and the stores that keep per-recording state in sync
//! with the server.

pub mod api_client;
pub mod models;
pub mod poller;
pub mod services;
pub mod session;
pub mod store;

pub use crate::api_client::ApiClient;
pub use crate::session::Session;
pub use eegwa_common::{ClassificationType, Error, Result};
