//! Currently opened recording

use crate::models::{RecordingAnalysis, SubjectEdit};
use crate::services::RecordingApi;
use crate::store::ClassificationStateStore;
use eegwa_common::api::RecordingUpdate;
use eegwa_common::{Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct AnalysisStore {
    api: Arc<dyn RecordingApi>,
    classification: Arc<ClassificationStateStore>,
    current: RwLock<Option<RecordingAnalysis>>,
}

impl AnalysisStore {
    pub fn new(api: Arc<dyn RecordingApi>, classification: Arc<ClassificationStateStore>) -> Self {
        Self {
            api,
            classification,
            current: RwLock::new(None),
        }
    }

    /// Load a recording and seed classification state from its stored results
    pub async fn fetch_recording(&self, id: &str) -> Result<RecordingAnalysis> {
        let detail = self.api.get_recording(id).await?;
        let analysis = RecordingAnalysis::from_detail(&detail)?;

        *self.current.write().await = Some(analysis.clone());

        if let Some(existing) = &detail.classification {
            self.classification.adopt_existing(existing).await;
        }

        info!(
            recording_id = %id,
            channels = analysis.channel_amount(),
            duration = %analysis.duration_string(),
            "Recording loaded"
        );
        Ok(analysis)
    }

    /// Rename and/or annotate the recording
    pub async fn update_recording(&self, id: &str, update: RecordingUpdate) -> Result<()> {
        self.api.update_recording(id, &update).await?;

        if let Some(current) = self.current.write().await.as_mut() {
            current.apply_update(update.name.as_deref(), update.notes.as_deref());
        }
        Ok(())
    }

    pub async fn update_subject(&self, id: &str, edit: SubjectEdit) -> Result<()> {
        let update = edit.to_update()?;
        self.api.update_subject(id, &update).await?;

        if let Some(current) = self.current.write().await.as_mut() {
            current.apply_subject(&edit);
        }
        Ok(())
    }

    pub async fn current(&self) -> Option<RecordingAnalysis> {
        self.current.read().await.clone()
    }

    /// Current recording, or an error when none is open
    pub async fn require_current(&self) -> Result<RecordingAnalysis> {
        self.current()
            .await
            .ok_or_else(|| Error::InvalidInput("No recording is open".to_string()))
    }

    pub async fn duration_string(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|r| r.duration_string())
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
