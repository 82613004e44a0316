//! Scripted in-memory fakes of the backend services
//!
//! Replies are queued up front and handed out in call order. A reply can be gated on a
//! oneshot so a test controls exactly when an in-flight call completes.

#![allow(dead_code)]

use async_trait::async_trait;
use eegwa_client::services::{AuthApi, ClassificationApi, RecordingApi, SortOrder, UserApi};
use eegwa_common::api::{
    ClassificationType, EnqueueReply, NewUser, PasswordUpdate, PersonalInfoUpdate, PlotFragment,
    RawSegment, RecordingDetail, RecordingListItemOut, RecordingUpdate, SubjectUpdate,
    TaskStatusReply, UserOut, UserToken,
};
use eegwa_common::{Error, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enqueue(String, ClassificationType),
    Poll(String),
    Delete(String, ClassificationType),
    Report(String, ClassificationType),
    GetRecording(String),
    List(Option<String>, SortOrder),
    UpdateRecording(String),
    UpdateSubject(String),
    DeleteRecording(String),
    Plot(String, u32),
    Login(String),
    CurrentUser,
    CreateUser(String),
    UpdatePassword,
    UpdatePersonalInfo(PersonalInfoUpdate),
    DeleteUser,
}

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    reply: Result<T>,
}

pub fn transport_error() -> Error {
    Error::Transport("connection refused".to_string())
}

pub fn status_error(status: u16) -> Error {
    Error::Status {
        status,
        message: "scripted".to_string(),
    }
}

pub fn raw_segment(nr: u32, prob: f64, std: Option<f64>) -> RawSegment {
    RawSegment {
        nr,
        prob,
        std,
        start_time: i64::from(nr) * 16,
        stop_time: i64::from(nr + 1) * 16,
    }
}

pub fn task_reply(task_id: &str, status: &str, result: Option<Value>) -> TaskStatusReply {
    TaskStatusReply {
        task_id: task_id.to_string(),
        status: status.to_string(),
        result,
    }
}

pub fn success_reply(task_id: &str, segments: &[RawSegment]) -> TaskStatusReply {
    task_reply(task_id, "SUCCESS", Some(json!(segments)))
}

/// Wait until `count` calls have reached the fake
pub async fn wait_for_calls(count: impl Fn() -> usize, expected: usize) {
    for _ in 0..1000 {
        if count() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("expected {} calls, saw {}", expected, count());
}

// ============================================================================
// Classification service fake
// ============================================================================

#[derive(Default)]
pub struct FakeClassificationApi {
    enqueue: Mutex<VecDeque<Scripted<EnqueueReply>>>,
    polls: Mutex<VecDeque<Result<TaskStatusReply>>>,
    deletes: Mutex<VecDeque<Result<()>>>,
    report: Mutex<Vec<RawSegment>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClassificationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_enqueue(&self, reply: Result<EnqueueReply>) {
        self.enqueue
            .lock()
            .unwrap()
            .push_back(Scripted { gate: None, reply });
    }

    /// Queue a reply that is only delivered once the returned sender fires
    pub fn push_gated_enqueue(&self, reply: Result<EnqueueReply>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.enqueue.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            reply,
        });
        tx
    }

    pub fn push_poll(&self, reply: Result<TaskStatusReply>) {
        self.polls.lock().unwrap().push_back(reply);
    }

    pub fn push_delete(&self, reply: Result<()>) {
        self.deletes.lock().unwrap().push_back(reply);
    }

    pub fn set_report(&self, segments: Vec<RawSegment>) {
        *self.report.lock().unwrap() = segments;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClassificationApi for FakeClassificationApi {
    async fn enqueue_or_compute(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<EnqueueReply> {
        self.record(Call::Enqueue(recording_id.to_string(), classification_type));
        let scripted = self.enqueue.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { gate, reply }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                reply
            }
            None => Err(transport_error()),
        }
    }

    async fn poll_task(&self, task_id: &str) -> Result<TaskStatusReply> {
        self.record(Call::Poll(task_id.to_string()));
        let reply = self.polls.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Err(transport_error()))
    }

    async fn delete_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
    ) -> Result<()> {
        self.record(Call::Delete(recording_id.to_string(), classification_type));
        let reply = self.deletes.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(()))
    }

    async fn get_report(
        &self,
        recording_id: &str,
        classification_type: ClassificationType,
        min_prob: f64,
        max_std: Option<f64>,
    ) -> Result<Vec<RawSegment>> {
        self.record(Call::Report(recording_id.to_string(), classification_type));
        let report = self.report.lock().unwrap().clone();
        Ok(report
            .into_iter()
            .filter(|s| s.prob >= min_prob)
            .filter(|s| match (max_std, s.std) {
                (Some(max), Some(std)) => std <= max,
                _ => true,
            })
            .collect())
    }
}

// ============================================================================
// Recording service fake
// ============================================================================

#[derive(Default)]
pub struct FakeRecordingApi {
    detail: Mutex<Option<RecordingDetail>>,
    list: Mutex<Vec<RecordingListItemOut>>,
    fragment: Mutex<Option<PlotFragment>>,
    fail_status: Mutex<Option<u16>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_detail(&self, detail: RecordingDetail) {
        *self.detail.lock().unwrap() = Some(detail);
    }

    pub fn set_list(&self, list: Vec<RecordingListItemOut>) {
        *self.list.lock().unwrap() = list;
    }

    pub fn set_fragment(&self, fragment: PlotFragment) {
        *self.fragment.lock().unwrap() = Some(fragment);
    }

    /// Make every following call fail with this HTTP status
    pub fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordingApi for FakeRecordingApi {
    async fn get_recording(&self, id: &str) -> Result<RecordingDetail> {
        self.enter(Call::GetRecording(id.to_string()))?;
        self.detail
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| status_error(404))
    }

    async fn list_recordings(
        &self,
        filter_text: Option<&str>,
        sort: SortOrder,
    ) -> Result<Vec<RecordingListItemOut>> {
        self.enter(Call::List(filter_text.map(str::to_string), sort))?;
        Ok(self.list.lock().unwrap().clone())
    }

    async fn update_recording(&self, id: &str, _update: &RecordingUpdate) -> Result<()> {
        self.enter(Call::UpdateRecording(id.to_string()))
    }

    async fn update_subject(&self, id: &str, _subject: &SubjectUpdate) -> Result<()> {
        self.enter(Call::UpdateSubject(id.to_string()))
    }

    async fn delete_recording(&self, id: &str) -> Result<()> {
        self.enter(Call::DeleteRecording(id.to_string()))
    }

    async fn plot_fragment(&self, id: &str, nr: u32) -> Result<PlotFragment> {
        self.enter(Call::Plot(id.to_string(), nr))?;
        self.fragment
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| status_error(404))
    }
}

// ============================================================================
// Account service fakes
// ============================================================================

/// Accepts exactly one username/password pair
pub struct FakeAuthApi {
    username: String,
    password: String,
    calls: Mutex<Vec<Call>>,
}

impl FakeAuthApi {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, username: &str, password: &str) -> Result<UserToken> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Login(username.to_string()));
        if username == self.username && password == self.password {
            Ok(UserToken {
                username: username.to_string(),
                access_token: format!("token-for-{}", username),
                token_type: "bearer".to_string(),
            })
        } else {
            Err(status_error(401))
        }
    }
}

pub fn sample_user() -> UserOut {
    UserOut {
        first_name: "Adam".to_string(),
        last_name: "Nowak".to_string(),
        email: "nowak.adam@gmail.com".to_string(),
        username: "a_nowak".to_string(),
    }
}

#[derive(Default)]
pub struct FakeUserApi {
    user: Mutex<Option<UserOut>>,
    fail_status: Mutex<Option<u16>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeUserApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user: UserOut) {
        *self.user.lock().unwrap() = Some(user);
    }

    /// Make every following call fail with this HTTP status
    pub fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserApi for FakeUserApi {
    async fn current_user(&self) -> Result<UserOut> {
        self.enter(Call::CurrentUser)?;
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| status_error(404))
    }

    async fn create_user(&self, user: &NewUser) -> Result<()> {
        self.enter(Call::CreateUser(user.username.clone()))
    }

    async fn update_password(&self, _update: &PasswordUpdate) -> Result<()> {
        self.enter(Call::UpdatePassword)
    }

    async fn update_personal_info(&self, update: &PersonalInfoUpdate) -> Result<()> {
        self.enter(Call::UpdatePersonalInfo(update.clone()))
    }

    async fn delete_user(&self) -> Result<()> {
        self.enter(Call::DeleteUser)?;
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}

/// Recording detail with a stored abnormal classification
pub fn recording_detail_with_abnormal() -> RecordingDetail {
    serde_json::from_value(json!({
        "_id": "rec-1",
        "name": "Night EEG",
        "created": "2020-11-03T15:58:51.532Z",
        "recording_info": {
            "n_times": 20000,
            "sfreq": 250.0,
            "ch_names": ["Fp1", "Fp2", "C3", "C4"]
        },
        "subject_info": {"first_name": "Adam", "last_name": "Nowak", "sex": 1, "hand": 1},
        "classification": {
            "abnormal": {"type": "abnormal", "segments": [
                {"nr": 0, "prob": 0.91, "std": 0.02, "start_time": 0, "stop_time": 16},
                {"nr": 1, "prob": 0.12, "std": 0.05, "start_time": 16, "stop_time": 32}
            ]}
        }
    }))
    .unwrap()
}
