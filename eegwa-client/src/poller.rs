//! Caller-side polling loop for queued classification jobs
//!
//! The store never polls by itself. This helper is what the CLI uses; any other
//! front end can drive `ClassificationStateStore::poll_task` on its own schedule.

use crate::store::{ClassificationStateStore, ClassificationStatus};
use eegwa_common::api::ClassificationType;
use eegwa_common::Result;
use std::time::Duration;
use tracing::debug;

/// Poll limits
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up (returning the still-pending status) after this many polls
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_polls: 300,
        }
    }
}

/// Poll the pending job of `classification_type` until it settles or the limit is hit.
///
/// Returns immediately when the type is not pending. Transport errors abort the loop
/// and leave the state untouched.
pub async fn poll_until_settled(
    store: &ClassificationStateStore,
    classification_type: ClassificationType,
    settings: PollSettings,
) -> Result<ClassificationStatus> {
    let mut polls = 0;
    loop {
        let status = store.status_of(classification_type).await;
        let task_id = match status.task_id() {
            Some(task_id) => task_id.to_string(),
            None => return Ok(status),
        };

        if polls >= settings.max_polls {
            debug!(task_id = %task_id, polls, "Poll limit reached");
            return Ok(status);
        }
        if polls > 0 {
            tokio::time::sleep(settings.interval).await;
        }
        polls += 1;

        let status = store.poll_task(&task_id, classification_type).await?;
        if status.task_id() != Some(task_id.as_str()) {
            return Ok(status);
        }
    }
}
