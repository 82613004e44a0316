//! Classification endpoints (`/classification`)

use crate::api_client::ApiClient;
use async_trait::async_trait;
use eegwa_common::api::{ClassificationType, EnqueueReply, RawSegment, TaskStatusReply};
use eegwa_common::Result;
use std::sync::Arc;
use tracing::{debug, info};

const RESOURCE: &str = "/classification";

/// Remote classification capability
///
/// The backend engine is opaque: it either answers with an already-computed segment
/// list or with a task id to poll.
#[async_trait]
pub trait ClassificationApi: Send + Sync {
    /// Queue a job, or get the stored result when the recording is already classified
    async fn enqueue_or_compute(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<EnqueueReply>;

    /// Query the state of a queued job
    async fn poll_task(&self, task_id: &str) -> Result<TaskStatusReply>;

    /// Remove a stored classification report
    async fn delete_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<()>;

    /// Stored report filtered server-side by minimum probability and maximum deviation
    async fn get_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
        min_prob: f64,
        max_std: Option<f64>,
    ) -> Result<Vec<RawSegment>>;
}

/// `ClassificationApi` over HTTP
pub struct HttpClassificationService {
    client: Arc<ApiClient>,
}

impl HttpClassificationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

fn type_query(classification_type: ClassificationType) -> [(&'static str, String); 1] {
    [("classification_type", classification_type.as_str().to_string())]
}

#[async_trait]
impl ClassificationApi for HttpClassificationService {
    async fn enqueue_or_compute(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<EnqueueReply> {
        let path = format!("{}/{}", RESOURCE, recording_id);
        let body = self
            .client
            .patch_query(&path, &type_query(classification_type))
            .await?;
        let reply = EnqueueReply::from_value(body)?;

        match &reply {
            EnqueueReply::Immediate(segments) => info!(
                recording_id = %recording_id,
                classification_type = %classification_type,
                segments = segments.len(),
                "Classification already computed"
            ),
            EnqueueReply::Deferred(task_id) => info!(
                recording_id = %recording_id,
                classification_type = %classification_type,
                task_id = %task_id,
                "Classification task queued"
            ),
        }

        Ok(reply)
    }

    async fn poll_task(&self, task_id: &str) -> Result<TaskStatusReply> {
        let path = format!("{}/{}", RESOURCE, task_id);
        let body = self.client.get(&path).await?;
        let reply: TaskStatusReply = serde_json::from_value(body)?;
        debug!(task_id = %task_id, status = %reply.status, "Polled classification task");
        Ok(reply)
    }

    async fn delete_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<()> {
        let path = format!("{}/{}/report", RESOURCE, recording_id);
        self.client
            .delete_with_query(&path, &type_query(classification_type))
            .await?;
        info!(
            recording_id = %recording_id,
            classification_type = %classification_type,
            "Classification report deleted"
        );
        Ok(())
    }

    async fn get_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
        min_prob: f64,
        max_std: Option<f64>,
    ) -> Result<Vec<RawSegment>> {
        let path = format!("{}/{}/report", RESOURCE, recording_id);
        let mut query = vec![
            ("classification_type", classification_type.as_str().to_string()),
            ("min_prob", min_prob.to_string()),
        ];
        if let Some(max_std) = max_std {
            query.push(("max_std", max_std.to_string()));
        }

        let body = self.client.get_with_query(&path, &query).await?;
        Ok(serde_json::from_value(body)?)
    }
}
