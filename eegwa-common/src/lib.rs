//! # EEGWA Common Library
//!
//! Shared code for the EEG Web Assistant client crates including:
//! - Wire types exchanged with the backend REST API
//! - Classification type enumeration
//! - Common error type
//! - Configuration loading
//! - Display formatting for dates and durations

pub mod api;
pub mod config;
pub mod error;
pub mod human_time;

pub use api::types::ClassificationType;
pub use error::{Error, FailureRoute, Result};
