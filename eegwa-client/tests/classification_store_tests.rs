//! Integration tests for the classification task lifecycle
//!
//! Tests cover:
//! - immediate vs deferred enqueue replies
//! - poll reconciliation (SUCCESS / FAILURE / REVOKED / still running)
//! - delete, adopt and reset transitions
//! - failure atomicity (transport errors leave state unchanged)
//! - out-of-order replies and replies arriving after reset

mod helpers;

use eegwa_client::store::{ClassificationStateStore, ClassificationStatus, RegistryEntry};
use eegwa_common::api::{ClassificationInfo, ClassificationType, EnqueueReply};
use eegwa_common::Error;
use helpers::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use ClassificationType::{Abnormal, Artifact, Seizure};

fn setup() -> (Arc<FakeClassificationApi>, Arc<ClassificationStateStore>) {
    let api = Arc::new(FakeClassificationApi::new());
    let store = Arc::new(ClassificationStateStore::new(api.clone()));
    (api, store)
}

/// Bring `t` to Pending(task_id) through the public API
async fn make_pending(
    api: &FakeClassificationApi,
    store: &ClassificationStateStore,
    t: ClassificationType,
    task_id: &str,
) {
    api.push_enqueue(Ok(EnqueueReply::Deferred(task_id.to_string())));
    store.request_or_fetch("rec-1", t).await.unwrap();
}

// =============================================================================
// Initial state
// =============================================================================

#[tokio::test]
async fn test_new_store_is_all_idle() {
    let (_api, store) = setup();

    for t in ClassificationType::ALL {
        assert_eq!(store.status_of(t).await, ClassificationStatus::Idle);
    }
    assert_eq!(store.available_types().await, vec![Abnormal, Artifact, Seizure]);
    assert!(store.disabled_types().await.is_empty());
    assert!(store.pending_tasks().await.is_empty());
}

// =============================================================================
// request_or_fetch
// =============================================================================

#[tokio::test]
async fn test_immediate_list_resolves_with_normalized_segments() {
    let (api, store) = setup();
    api.push_enqueue(Ok(EnqueueReply::Immediate(vec![
        raw_segment(0, 0.8532, Some(0.1)),
        raw_segment(1, 0.5, None),
    ])));

    let status = store.request_or_fetch("rec-1", Seizure).await.unwrap();

    let segments = status.segments().expect("resolved");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].prob, "85.32");
    assert_eq!(segments[0].std, "10.00");
    assert_eq!(segments[1].prob, "50.00");
    assert_eq!(segments[1].std, "NaN");
    assert_eq!(store.status_of(Seizure).await, status);
    assert_eq!(api.calls(), vec![Call::Enqueue("rec-1".into(), Seizure)]);
}

#[tokio::test]
async fn test_immediate_empty_list_still_resolves() {
    let (api, store) = setup();
    api.push_enqueue(Ok(EnqueueReply::Immediate(vec![])));

    store.request_or_fetch("rec-1", Artifact).await.unwrap();

    assert_eq!(
        store.status_of(Artifact).await,
        ClassificationStatus::Resolved(vec![])
    );
    assert_eq!(store.disabled_types().await, vec![Artifact]);
}

#[tokio::test]
async fn test_task_id_reply_makes_type_pending() {
    let (api, store) = setup();
    make_pending(&api, &store, Abnormal, "task-1").await;

    assert_eq!(
        store.status_of(Abnormal).await,
        ClassificationStatus::Pending("task-1".into())
    );
    assert_eq!(store.available_types().await, vec![Artifact, Seizure]);
    assert_eq!(
        store.pending_tasks().await,
        vec![(Abnormal, "task-1".to_string())]
    );
}

#[tokio::test]
async fn test_request_failure_leaves_state_unchanged() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-7").await;

    api.push_enqueue(Err(status_error(500)));
    let err = store.request_or_fetch("rec-1", Seizure).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), Some(500));
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-7".into())
    );
}

#[tokio::test]
async fn test_rerequest_while_pending_reissues_call() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;

    api.push_enqueue(Ok(EnqueueReply::Deferred("task-2".into())));
    store.request_or_fetch("rec-1", Seizure).await.unwrap();

    assert_eq!(api.call_count(), 2);
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-2".into())
    );
}

// =============================================================================
// poll_task
// =============================================================================

#[tokio::test]
async fn test_poll_success_resolves() {
    let (api, store) = setup();
    make_pending(&api, &store, Abnormal, "task-1").await;
    api.push_poll(Ok(success_reply("task-1", &[raw_segment(0, 0.95, Some(0.006))])));

    let status = store.poll_task("task-1", Abnormal).await.unwrap();

    let segments = status.segments().expect("resolved");
    assert_eq!(segments[0].prob, "95.00");
    assert_eq!(segments[0].std, "0.60");
    assert!(store.pending_tasks().await.is_empty());
    assert_eq!(store.disabled_types().await, vec![Abnormal]);
}

#[tokio::test]
async fn test_poll_failure_returns_to_idle() {
    let (api, store) = setup();
    make_pending(&api, &store, Artifact, "task-1").await;
    api.push_poll(Ok(task_reply("task-1", "FAILURE", Some(json!("worker crashed")))));

    let status = store.poll_task("task-1", Artifact).await.unwrap();

    assert_eq!(status, ClassificationStatus::Idle);
    assert!(store.available_types().await.contains(&Artifact));
}

#[tokio::test]
async fn test_poll_revoked_scenario() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-42").await;
    assert!(!store.available_types().await.contains(&Seizure));

    api.push_poll(Ok(task_reply("task-42", "REVOKED", None)));
    store.poll_task("task-42", Seizure).await.unwrap();

    assert_eq!(store.status_of(Seizure).await, ClassificationStatus::Idle);
    assert!(store.available_types().await.contains(&Seizure));
}

#[tokio::test]
async fn test_poll_running_status_changes_nothing() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;

    for status in ["PENDING", "STARTED", "RETRY"] {
        api.push_poll(Ok(task_reply("task-1", status, None)));
        let current = store.poll_task("task-1", Seizure).await.unwrap();
        assert_eq!(current, ClassificationStatus::Pending("task-1".into()));
    }
}

#[tokio::test]
async fn test_poll_transport_error_propagates_without_mutation() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;

    let err = store.poll_task("task-1", Seizure).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-1".into())
    );
}

#[tokio::test]
async fn test_poll_success_without_result_is_error() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;
    api.push_poll(Ok(task_reply("task-1", "SUCCESS", None)));

    assert!(matches!(
        store.poll_task("task-1", Seizure).await,
        Err(Error::Parse(_))
    ));
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-1".into())
    );
}

#[tokio::test]
async fn test_poll_untracked_task_is_noop() {
    let (api, store) = setup();
    api.push_poll(Ok(success_reply("ghost", &[raw_segment(0, 0.9, Some(0.1))])));

    let status = store.poll_task("ghost", Abnormal).await.unwrap();

    assert_eq!(status, ClassificationStatus::Idle);
    assert_eq!(store.status_of(Abnormal).await, ClassificationStatus::Idle);
}

#[tokio::test]
async fn test_poll_untracked_task_ignores_malformed_result() {
    let (api, store) = setup();
    api.push_poll(Ok(task_reply("ghost", "SUCCESS", Some(json!({"unexpected": true})))));

    let status = store.poll_task("ghost", Seizure).await.unwrap();

    assert_eq!(status, ClassificationStatus::Idle);
}

#[tokio::test]
async fn test_poll_for_superseded_task_is_ignored() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-old").await;
    make_pending(&api, &store, Seizure, "task-new").await;

    api.push_poll(Ok(task_reply("task-old", "REVOKED", None)));
    store.poll_task("task-old", Seizure).await.unwrap();

    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-new".into())
    );
}

// =============================================================================
// delete_result
// =============================================================================

#[tokio::test]
async fn test_delete_clears_resolved_and_pending() {
    let (api, store) = setup();
    api.push_enqueue(Ok(EnqueueReply::Immediate(vec![raw_segment(0, 0.7, Some(0.1))])));
    store.request_or_fetch("rec-1", Abnormal).await.unwrap();
    make_pending(&api, &store, Seizure, "task-1").await;

    for t in [Abnormal, Seizure, Artifact] {
        store.delete_result("rec-1", t).await.unwrap();
        assert_eq!(store.status_of(t).await, ClassificationStatus::Idle);
        assert!(store.available_types().await.contains(&t));
    }

    assert_eq!(store.available_types().await, ClassificationType::ALL.to_vec());
    assert!(api.calls().contains(&Call::Delete("rec-1".into(), Seizure)));
}

#[tokio::test]
async fn test_delete_failure_keeps_result() {
    let (api, store) = setup();
    api.push_enqueue(Ok(EnqueueReply::Immediate(vec![raw_segment(0, 0.7, Some(0.1))])));
    store.request_or_fetch("rec-1", Abnormal).await.unwrap();

    api.push_delete(Err(status_error(403)));
    let err = store.delete_result("rec-1", Abnormal).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(store.status_of(Abnormal).await.segments().is_some());
}

// =============================================================================
// adopt_existing / reset / registry
// =============================================================================

#[tokio::test]
async fn test_adopt_existing_only_touches_present_types() {
    let (_api, store) = setup();
    let mut existing = BTreeMap::new();
    existing.insert(
        Abnormal,
        ClassificationInfo {
            classification_type: Some(Abnormal),
            segments: vec![raw_segment(0, 0.25, Some(0.01))],
        },
    );

    store.adopt_existing(&existing).await;

    let segments = store.status_of(Abnormal).await;
    assert_eq!(segments.segments().unwrap()[0].prob, "25.00");
    assert_eq!(store.status_of(Artifact).await, ClassificationStatus::Idle);
    assert_eq!(store.status_of(Seizure).await, ClassificationStatus::Idle);
}

#[tokio::test]
async fn test_adopt_existing_overrides_pending() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;

    let mut existing = BTreeMap::new();
    existing.insert(
        Seizure,
        ClassificationInfo {
            classification_type: None,
            segments: vec![],
        },
    );
    store.adopt_existing(&existing).await;

    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Resolved(vec![])
    );
    assert!(store.pending_tasks().await.is_empty());
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;
    api.push_enqueue(Ok(EnqueueReply::Immediate(vec![])));
    store.request_or_fetch("rec-1", Abnormal).await.unwrap();

    store.reset().await;
    store.reset().await;

    for entry in store.registry().await {
        assert_eq!(
            entry,
            RegistryEntry {
                classification_type: entry.classification_type,
                disabled: false,
            }
        );
    }
    assert_eq!(store.available_types().await, ClassificationType::ALL.to_vec());
}

#[tokio::test]
async fn test_registry_order_and_flags() {
    let (api, store) = setup();
    make_pending(&api, &store, Artifact, "task-1").await;

    let registry = store.registry().await;
    let flags: Vec<(ClassificationType, bool)> = registry
        .iter()
        .map(|e| (e.classification_type, e.disabled))
        .collect();
    assert_eq!(
        flags,
        vec![(Abnormal, false), (Artifact, true), (Seizure, false)]
    );
}

// =============================================================================
// Outstanding requests
// =============================================================================

#[tokio::test]
async fn test_stale_reply_does_not_overwrite_newer_request() {
    let (api, store) = setup();
    let release_first = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-old".into())));
    let release_second = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-new".into())));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;

    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 2).await;

    // Newer reply lands first, older one afterwards
    release_second.send(()).unwrap();
    let second_status = second.await.unwrap().unwrap();
    assert_eq!(second_status, ClassificationStatus::Pending("task-new".into()));

    release_first.send(()).unwrap();
    let first_status = first.await.unwrap().unwrap();
    assert_eq!(first_status, ClassificationStatus::Pending("task-new".into()));

    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Pending("task-new".into())
    );
}

#[tokio::test]
async fn test_failed_request_keeps_earlier_reply_valid() {
    let (api, store) = setup();
    let release_first = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-a".into())));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;

    api.push_enqueue(Err(transport_error()));
    assert!(store.request_or_fetch("rec-1", Seizure).await.is_err());
    assert_eq!(store.status_of(Seizure).await, ClassificationStatus::Idle);

    release_first.send(()).unwrap();
    let first_status = first.await.unwrap().unwrap();

    assert_eq!(first_status, ClassificationStatus::Pending("task-a".into()));
    assert_eq!(
        store.pending_tasks().await,
        vec![(Seizure, "task-a".to_string())]
    );
}

#[tokio::test]
async fn test_older_reply_applies_when_newer_is_still_in_flight() {
    let (api, store) = setup();
    let release_first = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-old".into())));
    let release_second = api.push_gated_enqueue(Ok(EnqueueReply::Immediate(vec![])));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 2).await;

    release_first.send(()).unwrap();
    assert_eq!(
        first.await.unwrap().unwrap(),
        ClassificationStatus::Pending("task-old".into())
    );

    release_second.send(()).unwrap();
    assert_eq!(
        second.await.unwrap().unwrap(),
        ClassificationStatus::Resolved(vec![])
    );
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Resolved(vec![])
    );
}

#[tokio::test]
async fn test_reply_after_delete_is_discarded() {
    let (api, store) = setup();
    let release = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-a".into())));

    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Artifact).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;

    store.delete_result("rec-1", Artifact).await.unwrap();
    release.send(()).unwrap();

    assert_eq!(pending.await.unwrap().unwrap(), ClassificationStatus::Idle);
    assert!(store.pending_tasks().await.is_empty());
}

#[tokio::test]
async fn test_reply_after_reset_is_discarded() {
    let (api, store) = setup();
    let release = api.push_gated_enqueue(Ok(EnqueueReply::Immediate(vec![raw_segment(
        0,
        0.9,
        Some(0.1),
    )])));

    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Abnormal).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;

    store.reset().await;
    release.send(()).unwrap();

    assert_eq!(pending.await.unwrap().unwrap(), ClassificationStatus::Idle);
    assert_eq!(store.status_of(Abnormal).await, ClassificationStatus::Idle);
}

#[tokio::test]
async fn test_different_types_can_be_outstanding_together() {
    let (api, store) = setup();
    let release_abnormal = api.push_gated_enqueue(Ok(EnqueueReply::Deferred("task-a".into())));
    let release_seizure = api.push_gated_enqueue(Ok(EnqueueReply::Immediate(vec![])));

    let abnormal = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Abnormal).await })
    };
    wait_for_calls(|| api.call_count(), 1).await;
    let seizure = {
        let store = store.clone();
        tokio::spawn(async move { store.request_or_fetch("rec-1", Seizure).await })
    };
    wait_for_calls(|| api.call_count(), 2).await;

    release_seizure.send(()).unwrap();
    release_abnormal.send(()).unwrap();
    abnormal.await.unwrap().unwrap();
    seizure.await.unwrap().unwrap();

    assert_eq!(
        store.status_of(Abnormal).await,
        ClassificationStatus::Pending("task-a".into())
    );
    assert_eq!(
        store.status_of(Seizure).await,
        ClassificationStatus::Resolved(vec![])
    );
    assert_eq!(store.available_types().await, vec![Artifact]);
}

#[tokio::test]
async fn test_status_never_pending_and_resolved_at_once() {
    let (api, store) = setup();
    make_pending(&api, &store, Seizure, "task-1").await;
    api.push_poll(Ok(success_reply("task-1", &[raw_segment(0, 0.4, Some(0.2))])));
    store.poll_task("task-1", Seizure).await.unwrap();

    let status = store.status_of(Seizure).await;
    assert!(status.segments().is_some());
    assert!(status.task_id().is_none());
    assert!(store.pending_tasks().await.is_empty());
}
