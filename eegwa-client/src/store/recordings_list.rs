//! The signed-in user's recordings

use crate::models::RecordingListItem;
use crate::services::{RecordingApi, SortOrder};
use eegwa_common::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub struct RecordingsListStore {
    api: Arc<dyn RecordingApi>,
    items: RwLock<Option<Vec<RecordingListItem>>>,
}

impl RecordingsListStore {
    pub fn new(api: Arc<dyn RecordingApi>) -> Self {
        Self {
            api,
            items: RwLock::new(None),
        }
    }

    pub async fn fetch(
        &self,
        filter_text: Option<&str>,
        sort: SortOrder,
    ) -> Result<Vec<RecordingListItem>> {
        let wire = self.api.list_recordings(filter_text, sort).await?;
        let items = wire
            .iter()
            .map(RecordingListItem::from_wire)
            .collect::<Result<Vec<_>>>()?;

        debug!(count = items.len(), sort = %sort, "Recordings list refreshed");
        *self.items.write().await = Some(items.clone());
        Ok(items)
    }

    /// Delete on the server, then drop the row locally
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_recording(id).await?;

        if let Some(items) = self.items.write().await.as_mut() {
            items.retain(|item| item.id != id);
        }
        Ok(())
    }

    /// `None` until the first successful fetch
    pub async fn items(&self) -> Option<Vec<RecordingListItem>> {
        self.items.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.items.write().await = None;
    }
}
