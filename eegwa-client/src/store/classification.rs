//! Classification task lifecycle
//!
//! Every classification type is in exactly one of three states:
//!
//! ```text
//! Idle     --request: task id-------> Pending
//! Idle     --request: segment list--> Resolved
//! Pending  --poll SUCCESS-----------> Resolved
//! Pending  --poll FAILURE/REVOKED---> Idle
//! any      --delete / reset---------> Idle
//! ```
//!
//! Polling is driven by the caller; the store only reconciles replies. Operations take
//! `&self` so several types can have requests outstanding at once. The lock is never
//! held across a remote call.
//!
//! Every request gets a sequence number. A reply is applied only if no later-issued request
//! for the same type has already been applied, and no delete or reset happened for that
//! type since it was issued. A slow reply can neither overwrite a fresher one nor resurrect
//! state after `reset()`, and a request that fails invalidates nothing.

use crate::models::{normalize_all, ClassificationSegment};
use crate::services::ClassificationApi;
use eegwa_common::api::{ClassificationInfo, ClassificationType, EnqueueReply, TaskId, TaskState};
use eegwa_common::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Job state of one classification type
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "value")]
pub enum ClassificationStatus {
    /// Nothing requested, nothing held
    #[default]
    Idle,
    /// Remote job queued under this task id
    Pending(TaskId),
    /// Final result (possibly empty)
    Resolved(Vec<ClassificationSegment>),
}

impl ClassificationStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, ClassificationStatus::Idle)
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            ClassificationStatus::Pending(task_id) => Some(task_id),
            _ => None,
        }
    }

    pub fn segments(&self) -> Option<&[ClassificationSegment]> {
        match self {
            ClassificationStatus::Resolved(segments) => Some(segments),
            _ => None,
        }
    }
}

/// Registry row: a type and whether the UI may request it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub classification_type: ClassificationType,
    /// Pending or Resolved
    pub disabled: bool,
}

#[derive(Debug, Default)]
struct TypeSlot {
    status: ClassificationStatus,
    /// Sequence number of the newest request whose reply was applied
    last_applied: u64,
    /// Bumped by delete and reset; replies issued under an older epoch are dropped
    epoch: u64,
}

#[derive(Debug)]
struct StoreState {
    slots: BTreeMap<ClassificationType, TypeSlot>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            slots: ClassificationType::ALL
                .into_iter()
                .map(|t| (t, TypeSlot::default()))
                .collect(),
        }
    }

    fn slot(&mut self, t: ClassificationType) -> &mut TypeSlot {
        self.slots.entry(t).or_default()
    }

    fn status(&self, t: ClassificationType) -> ClassificationStatus {
        self.slots
            .get(&t)
            .map(|s| s.status.clone())
            .unwrap_or_default()
    }

    fn epoch(&self, t: ClassificationType) -> u64 {
        self.slots.get(&t).map_or(0, |s| s.epoch)
    }

    /// Forget `t` and invalidate replies still in flight for it
    fn clear(&mut self, t: ClassificationType) {
        let slot = self.slot(t);
        slot.epoch += 1;
        slot.status = ClassificationStatus::Idle;
    }
}

/// Per-session classification state
pub struct ClassificationStateStore {
    api: Arc<dyn ClassificationApi>,
    state: RwLock<StoreState>,
    next_request: AtomicU64,
}

impl ClassificationStateStore {
    pub fn new(api: Arc<dyn ClassificationApi>) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState::new()),
            next_request: AtomicU64::new(1),
        }
    }

    /// Ask the backend to classify `recording_id`, or return the stored result.
    ///
    /// An immediate segment list resolves the type; a task id makes it pending.
    /// Calling again while pending re-issues the request. A reply never overwrites the
    /// applied reply of a later-issued request.
    /// On failure the state is unchanged and the error is returned as-is.
    pub async fn request_or_fetch(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<ClassificationStatus> {
        let seq = self.next_request.fetch_add(1, Ordering::Relaxed);
        let epoch = self.state.read().await.epoch(classification_type);

        debug!(
            recording_id = %recording_id,
            classification_type = %classification_type,
            seq,
            "Requesting classification"
        );

        let next = match self
            .api
            .enqueue_or_compute(recording_id, classification_type)
            .await?
        {
            EnqueueReply::Immediate(raw) => ClassificationStatus::Resolved(normalize_all(&raw)),
            EnqueueReply::Deferred(task_id) => ClassificationStatus::Pending(task_id),
        };

        let mut state = self.state.write().await;
        let slot = state.slot(classification_type);
        if slot.epoch != epoch || slot.last_applied > seq {
            warn!(
                recording_id = %recording_id,
                classification_type = %classification_type,
                seq,
                "Discarding classification reply superseded by a newer request"
            );
            return Ok(slot.status.clone());
        }

        info!(
            recording_id = %recording_id,
            classification_type = %classification_type,
            pending = next.task_id().is_some(),
            "Classification state updated"
        );
        slot.last_applied = seq;
        slot.status = next.clone();
        Ok(next)
    }

    /// Reconcile one poll of `task_id`.
    ///
    /// - SUCCESS: resolved with the normalized segments
    /// - FAILURE / REVOKED: back to idle
    /// - anything else: unchanged, poll again later
    ///
    /// Replies for a task that is no longer the pending job of this type are ignored.
    pub async fn poll_task(
        &self,
        task_id: &str,
        classification_type: ClassificationType,
    ) -> Result<ClassificationStatus> {
        let reply = self.api.poll_task(task_id).await?;

        let mut state = self.state.write().await;
        let current = state.status(classification_type);
        if current.task_id() != Some(task_id) {
            debug!(
                task_id = %task_id,
                classification_type = %classification_type,
                "Ignoring poll reply for untracked task"
            );
            return Ok(current);
        }

        let next = match reply.state() {
            TaskState::Success => ClassificationStatus::Resolved(normalize_all(&reply.segments()?)),
            TaskState::Failure | TaskState::Revoked => ClassificationStatus::Idle,
            TaskState::Other(status) => {
                debug!(task_id = %task_id, status = %status, "Classification task still running");
                return Ok(current);
            }
        };

        info!(
            task_id = %task_id,
            classification_type = %classification_type,
            status = %reply.status,
            "Classification task finished"
        );
        state.slot(classification_type).status = next.clone();
        Ok(next)
    }

    /// Delete the stored report, then forget the type entirely
    pub async fn delete_result(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<()> {
        self.api
            .delete_report(recording_id, classification_type)
            .await?;

        self.state.write().await.clear(classification_type);
        Ok(())
    }

    /// Seed resolved results from a recording's already-computed classifications.
    /// Types absent from `existing` are left as they are.
    pub async fn adopt_existing(&self, existing: &BTreeMap<ClassificationType, ClassificationInfo>) {
        let mut state = self.state.write().await;
        for (classification_type, info) in existing {
            debug!(
                classification_type = %classification_type,
                segments = info.segments.len(),
                "Adopting stored classification"
            );
            state.slot(*classification_type).status =
                ClassificationStatus::Resolved(normalize_all(&info.segments));
        }
    }

    /// Return every type to idle and drop replies still in flight
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        for t in ClassificationType::ALL {
            state.clear(t);
        }
    }

    pub async fn status_of(&self, classification_type: ClassificationType) -> ClassificationStatus {
        self.state.read().await.status(classification_type)
    }

    /// Idle types, in display order
    pub async fn available_types(&self) -> Vec<ClassificationType> {
        self.registry()
            .await
            .into_iter()
            .filter(|e| !e.disabled)
            .map(|e| e.classification_type)
            .collect()
    }

    /// Pending or resolved types, in display order
    pub async fn disabled_types(&self) -> Vec<ClassificationType> {
        self.registry()
            .await
            .into_iter()
            .filter(|e| e.disabled)
            .map(|e| e.classification_type)
            .collect()
    }

    pub async fn registry(&self) -> Vec<RegistryEntry> {
        let state = self.state.read().await;
        ClassificationType::ALL
            .into_iter()
            .map(|t| RegistryEntry {
                classification_type: t,
                disabled: !state.status(t).is_idle(),
            })
            .collect()
    }

    /// Jobs the caller still has to poll
    pub async fn pending_tasks(&self) -> Vec<(ClassificationType, TaskId)> {
        let state = self.state.read().await;
        state
            .slots
            .iter()
            .filter_map(|(t, slot)| slot.status.task_id().map(|id| (*t, id.to_string())))
            .collect()
    }
}
