//! Shared API request/response types
//!
//! Field names follow the backend JSON exactly (snake_case, `_id` for document ids).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of an asynchronous classification job
pub type TaskId = String;

// ========================================
// Classification Types
// ========================================

/// Category of automated EEG finding
///
/// Variant order is display order, not severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationType {
    Abnormal,
    Artifact,
    Seizure,
}

impl ClassificationType {
    /// Every classification type, in display order
    pub const ALL: [ClassificationType; 3] = [
        ClassificationType::Abnormal,
        ClassificationType::Artifact,
        ClassificationType::Seizure,
    ];

    /// Wire label (`classification_type` query value)
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationType::Abnormal => "abnormal",
            ClassificationType::Artifact => "artifact",
            ClassificationType::Seizure => "seizure",
        }
    }
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abnormal" => Ok(ClassificationType::Abnormal),
            "artifact" => Ok(ClassificationType::Artifact),
            "seizure" => Ok(ClassificationType::Seizure),
            other => Err(Error::InvalidInput(format!(
                "Unknown classification type '{}' (expected abnormal, artifact or seizure)",
                other
            ))),
        }
    }
}

/// One classified window as stored by the backend
///
/// `prob` and `std` are fractions in 0..1. `std` may be missing from older reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    /// Ordinal of the window within the recording
    pub nr: u32,
    /// Mean probability of the finding
    pub prob: f64,
    /// Standard deviation of the probability
    #[serde(default)]
    pub std: Option<f64>,
    /// Window start, in recording seconds
    pub start_time: i64,
    /// Window stop, in recording seconds
    pub stop_time: i64,
}

/// Stored classification bundle for one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationInfo {
    #[serde(default, rename = "type")]
    pub classification_type: Option<ClassificationType>,
    pub segments: Vec<RawSegment>,
}

/// Reply of `PATCH /classification/{recording_id}`
///
/// The backend answers 200 with the stored segment list when the recording was already
/// classified, or 202 with a bare task id string when a job was queued.
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueReply {
    /// Result already computed
    Immediate(Vec<RawSegment>),
    /// Job queued; poll the task id
    Deferred(TaskId),
}

impl EnqueueReply {
    /// Discriminate the reply by whether the body is an array
    pub fn from_value(body: Value) -> Result<Self> {
        match body {
            Value::Array(_) => {
                let segments: Vec<RawSegment> = serde_json::from_value(body)?;
                Ok(EnqueueReply::Immediate(segments))
            }
            Value::String(task_id) => Ok(EnqueueReply::Deferred(task_id)),
            other => Err(Error::Parse(format!(
                "Expected segment list or task id, got: {}",
                other
            ))),
        }
    }
}

/// Celery-style task state reported by `GET /classification/{task_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Success,
    Failure,
    Revoked,
    /// PENDING, STARTED, RETRY, or anything else still in flight
    Other(String),
}

impl From<&str> for TaskState {
    fn from(status: &str) -> Self {
        match status {
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            "REVOKED" => TaskState::Revoked,
            other => TaskState::Other(other.to_string()),
        }
    }
}

/// Reply of `GET /classification/{task_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusReply {
    pub task_id: TaskId,
    pub status: String,
    /// Segment list on SUCCESS, error details or null otherwise
    #[serde(default)]
    pub result: Option<Value>,
}

impl TaskStatusReply {
    pub fn state(&self) -> TaskState {
        TaskState::from(self.status.as_str())
    }

    /// Decode `result` as a segment list (only meaningful on SUCCESS)
    pub fn segments(&self) -> Result<Vec<RawSegment>> {
        match &self.result {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(Error::Parse(format!(
                "Task {} reported {} without a result",
                self.task_id, self.status
            ))),
        }
    }
}

// ========================================
// Recording Types
// ========================================

/// Acquisition parameters read from the EDF header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    #[serde(default)]
    pub meas_date: Option<String>,
    #[serde(default)]
    pub highpass: Option<f64>,
    #[serde(default)]
    pub lowpass: Option<f64>,
    pub n_times: u64,
    pub sfreq: f64,
    pub ch_names: Vec<String>,
}

/// Subject (patient) data attached to a recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub sex: Option<u8>,
    #[serde(default)]
    pub hand: Option<u8>,
}

/// Reply of `GET /recording/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created: String,
    pub recording_info: RecordingInfo,
    #[serde(default)]
    pub subject_info: Option<SubjectInfo>,
    /// Already-computed classifications keyed by type
    #[serde(default)]
    pub classification: Option<BTreeMap<ClassificationType, ClassificationInfo>>,
}

/// Element of `GET /recording/all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingListItemOut {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub created: String,
    #[serde(default)]
    pub subject_full_name: Option<String>,
}

/// Reply of `GET /recording/{id}/plot/{nr}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotFragment {
    pub ch_names: Vec<String>,
    pub data_array: Vec<Vec<f64>>,
    pub sfreq: f64,
}

/// Body of `PATCH /recording/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PATCH /recording/{id}/subject_info`
///
/// `birthday` is epoch milliseconds; `sex` and `hand` are the backend integer codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectUpdate {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birthday: Option<i64>,
    pub sex: Option<u8>,
    pub hand: Option<u8>,
}

// ========================================
// Account Types
// ========================================

/// Reply of `POST /auth/token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserToken {
    pub username: String,
    pub access_token: String,
    pub token_type: String,
}

/// Reply of `GET /user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOut {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
}

/// Body of `POST /user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Body of `PATCH /user/password`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordUpdate {
    pub current_password: String,
    pub new_password: String,
}

/// Body of `PATCH /user/personal_info`
///
/// Unset or empty fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PersonalInfoUpdate {
    /// Drop empty strings so they are not sent as values
    pub fn non_empty(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            email: keep(self.email),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}
