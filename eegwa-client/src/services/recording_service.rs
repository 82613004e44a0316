//! Recording endpoints (`/recording`)

use crate::api_client::ApiClient;
use async_trait::async_trait;
use eegwa_common::api::{
    PlotFragment, RecordingDetail, RecordingListItemOut, RecordingUpdate, SubjectUpdate,
};
use eegwa_common::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const RESOURCE: &str = "/recording";

/// Recording list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    SubjectAsc,
    SubjectDesc,
}

impl SortOrder {
    /// `sort_by` query value understood by the backend
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Newest => "date.desc",
            SortOrder::Oldest => "date.asc",
            SortOrder::SubjectAsc => "subject.asc",
            SortOrder::SubjectDesc => "subject.desc",
        }
    }

    /// Label shown in the sort selector
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::SubjectAsc => "subject A-Z",
            SortOrder::SubjectDesc => "subject Z-A",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "subject A-Z" | "subject-asc" => Ok(SortOrder::SubjectAsc),
            "subject Z-A" | "subject-desc" => Ok(SortOrder::SubjectDesc),
            other => Err(Error::InvalidInput(format!("Unknown sort order '{}'", other))),
        }
    }
}

/// Recording resource operations
#[async_trait]
pub trait RecordingApi: Send + Sync {
    async fn get_recording(&self, id: &str) -> Result<RecordingDetail>;

    async fn list_recordings(
        &self,
        filter_text: Option<&str>,
        sort: SortOrder,
    ) -> Result<Vec<RecordingListItemOut>>;

    async fn update_recording(&self, id: &str, update: &RecordingUpdate) -> Result<()>;

    async fn update_subject(&self, id: &str, subject: &SubjectUpdate) -> Result<()>;

    async fn delete_recording(&self, id: &str) -> Result<()>;

    /// Signal window `nr` (fixed-length fragments) for plotting
    async fn plot_fragment(&self, id: &str, nr: u32) -> Result<PlotFragment>;
}

/// `RecordingApi` over HTTP
pub struct HttpRecordingService {
    client: Arc<ApiClient>,
}

impl HttpRecordingService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordingApi for HttpRecordingService {
    async fn get_recording(&self, id: &str) -> Result<RecordingDetail> {
        let body = self.client.get(&format!("{}/{}", RESOURCE, id)).await?;
        let detail: RecordingDetail = serde_json::from_value(body)?;
        debug!(recording_id = %id, name = %detail.name, "Fetched recording");
        Ok(detail)
    }

    async fn list_recordings(
        &self,
        filter_text: Option<&str>,
        sort: SortOrder,
    ) -> Result<Vec<RecordingListItemOut>> {
        let mut query = vec![("sort_by", sort.as_query().to_string())];
        if let Some(filter) = filter_text.filter(|f| !f.is_empty()) {
            query.push(("filter_text", filter.to_string()));
        }
        let body = self
            .client
            .get_with_query(&format!("{}/all", RESOURCE), &query)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn update_recording(&self, id: &str, update: &RecordingUpdate) -> Result<()> {
        self.client
            .patch_json(&format!("{}/{}", RESOURCE, id), update)
            .await?;
        info!(recording_id = %id, "Recording updated");
        Ok(())
    }

    async fn update_subject(&self, id: &str, subject: &SubjectUpdate) -> Result<()> {
        self.client
            .patch_json(&format!("{}/{}/subject_info", RESOURCE, id), subject)
            .await?;
        info!(recording_id = %id, "Recording subject updated");
        Ok(())
    }

    async fn delete_recording(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("{}/{}", RESOURCE, id)).await?;
        info!(recording_id = %id, "Recording deleted");
        Ok(())
    }

    async fn plot_fragment(&self, id: &str, nr: u32) -> Result<PlotFragment> {
        let body = self
            .client
            .get(&format!("{}/{}/plot/{}", RESOURCE, id, nr))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}
