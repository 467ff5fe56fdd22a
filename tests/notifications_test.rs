mod common;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use campus_data::backend::{Filter, IsValue, Request};
use campus_data::model::{NewNotification, NotificationType};
use campus_data::ops::notifications;
use campus_data::DataError;
use common::{backend_error, backend_error_with_status, param, select_query, RecordingBackend};
use serde_json::{json, Value};
use uuid::Uuid;

fn notification(
    kind: &str,
    actor: Option<Uuid>,
    session: Option<Uuid>,
    tag: Option<Uuid>,
) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": Uuid::new_v4(),
        "type": kind,
        "actor_id": actor,
        "session_id": session,
        "tag_id": tag,
        "created_at": "2026-05-02T12:00:00Z",
        "read": null,
    })
}

type Fixture = Result<Value, DataError>;

/// Answers the list query with `rows` and each single-row lookup from the
/// per-table fixtures, keyed by the `id` filter.
fn routed(rows: Value, lookups: HashMap<(String, String), Fixture>) -> RecordingBackend {
    RecordingBackend::new(move |request| {
        let query = match request {
            Request::Select(q) => q,
            other => panic!("unexpected request {other:?}"),
        };
        if query.table == "notifications" {
            return Ok(rows.clone());
        }
        let id = query.eq_value("id").expect("lookup by id").to_string();
        match lookups.get(&(query.table.clone(), id)) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(DataError::Backend { status, code, message, .. })) => {
                Err(backend_error_with_status(*status, code, message))
            }
            Some(Err(other)) => panic!("unsupported fixture error {other:?}"),
            None => panic!("no fixture for {}", query.table),
        }
    })
}

fn count_for(calls: &[Request], table: &str) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, Request::Select(q) if q.table == table))
        .count()
}

#[tokio::test]
async fn list_query_shape() {
    let user = Uuid::new_v4();
    let backend = RecordingBackend::with_responses(vec![Ok(json!([]))]);

    let list = notifications::fetch_notifications(&backend, user).await.unwrap();
    assert!(list.is_empty());

    let calls = backend.calls().await;
    assert_eq!(calls.len(), 1);
    let q = select_query(&calls[0]);
    assert_eq!(q.table, "notifications");
    assert_eq!(param(q, "user_id"), Some(format!("eq.{user}")));
    assert_eq!(param(q, "order").as_deref(), Some("created_at.desc"));
    assert_eq!(param(q, "limit").as_deref(), Some("50"));
}

#[tokio::test]
async fn session_only_notification_gets_only_session_summary() {
    let session = Uuid::new_v4();
    let rows = json!([notification("session_join", None, Some(session), None)]);
    let mut lookups = HashMap::new();
    lookups.insert(
        ("sessions".to_string(), session.to_string()),
        Ok(json!({ "id": session, "title": "Physics lab prep" })),
    );
    let backend = routed(rows, lookups);

    let list = notifications::fetch_notifications(&backend, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    let n = &list[0];
    assert_eq!(n.kind, NotificationType::SessionJoin);
    assert!(n.user.is_none());
    assert!(n.tag.is_none());
    assert_eq!(n.session.as_ref().unwrap().title, "Physics lab prep");
    assert!(!n.read);

    // one list query plus exactly one lookup
    assert_eq!(backend.calls().await.len(), 2);

    let json = serde_json::to_value(n).unwrap();
    assert!(json.get("user").is_none());
    assert!(json.get("tag").is_none());
    assert_eq!(json["type"], "session_join");
}

#[tokio::test]
async fn deleted_tag_leaves_summary_absent() {
    let (actor, tag) = (Uuid::new_v4(), Uuid::new_v4());
    let rows = json!([notification("tag_added", Some(actor), None, Some(tag))]);
    let mut lookups = HashMap::new();
    lookups.insert(
        ("profiles".to_string(), actor.to_string()),
        Ok(json!({ "id": actor, "username": "kabir" })),
    );
    lookups.insert(
        ("tags".to_string(), tag.to_string()),
        Err(backend_error_with_status(
            406,
            "PGRST116",
            "JSON object requested, multiple (or no) rows returned",
        )),
    );
    let backend = routed(rows, lookups);

    let list = notifications::fetch_notifications(&backend, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(list[0].user.as_ref().unwrap().username, "kabir");
    assert!(list[0].tag.is_none());
}

#[tokio::test]
async fn unavailable_lookup_fails_the_whole_call() {
    let session = Uuid::new_v4();
    let rows = json!([notification("session_join", None, Some(session), None)]);
    let mut lookups = HashMap::new();
    lookups.insert(
        ("sessions".to_string(), session.to_string()),
        Err(backend_error_with_status(503, "503", "upstream unavailable")),
    );
    let backend = routed(rows, lookups);

    let err = notifications::fetch_notifications(&backend, Uuid::new_v4())
        .await
        .unwrap_err();
    match err {
        DataError::Backend { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn mixed_rows_each_keep_their_own_summaries() {
    let (actor, session, tag) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let other_session = Uuid::new_v4();
    let rows = json!([
        notification("session_join", None, Some(session), None),
        notification("friend_request", Some(actor), None, None),
        notification("tag_added", Some(actor), None, Some(tag)),
        notification("session_invite", Some(actor), Some(other_session), None),
        notification("message", None, None, None),
        notification("session_leave", None, Some(session), None),
    ]);
    let mut lookups = HashMap::new();
    lookups.insert(
        ("profiles".to_string(), actor.to_string()),
        Ok(json!({ "id": actor, "username": "nisha" })),
    );
    lookups.insert(
        ("sessions".to_string(), session.to_string()),
        Ok(json!({ "id": session, "title": "Chem revision" })),
    );
    lookups.insert(
        ("sessions".to_string(), other_session.to_string()),
        Ok(json!({ "id": other_session, "title": "Hackathon prep" })),
    );
    lookups.insert(
        ("tags".to_string(), tag.to_string()),
        Ok(json!({ "id": tag, "name": "Robotics", "color": null, "emoji": "🤖" })),
    );

    // Stagger by table so lookups of different rows interleave.
    let backend = routed(rows, lookups).with_delay(|request| match request {
        Request::Select(q) if q.table == "profiles" => Duration::from_millis(40),
        Request::Select(q) if q.table == "sessions" => Duration::from_millis(10),
        Request::Select(q) if q.table == "tags" => Duration::from_millis(25),
        _ => Duration::ZERO,
    });

    let list = notifications::fetch_notifications_with_limit(&backend, Uuid::new_v4(), 3)
        .await
        .unwrap();
    assert_eq!(list.len(), 6);

    let shape: Vec<_> = list
        .iter()
        .map(|n| {
            (
                n.user.as_ref().map(|u| u.username.as_str()),
                n.session.as_ref().map(|s| s.title.as_str()),
                n.tag.as_ref().map(|t| t.name.as_str()),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            (None, Some("Chem revision"), None),
            (Some("nisha"), None, None),
            (Some("nisha"), None, Some("Robotics")),
            (Some("nisha"), Some("Hackathon prep"), None),
            (None, None, None),
            (None, Some("Chem revision"), None),
        ]
    );

    // one lookup per non-null id, none for null ids
    let calls = backend.calls().await;
    assert_eq!(count_for(&calls, "notifications"), 1);
    assert_eq!(count_for(&calls, "profiles"), 3);
    assert_eq!(count_for(&calls, "sessions"), 3);
    assert_eq!(count_for(&calls, "tags"), 1);
}

#[tokio::test]
async fn list_failure_fails_the_whole_call() {
    let backend =
        RecordingBackend::with_responses(vec![Err(backend_error("42P01", "missing relation"))]);
    let err = notifications::fetch_notifications(&backend, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Backend { ref code, .. } if code == "42P01"));
    assert_eq!(backend.calls().await.len(), 1);
}

#[tokio::test]
async fn enrichment_runs_concurrently_and_keeps_order() {
    let sessions: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let actors: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let rows: Vec<Value> = sessions
        .iter()
        .zip(&actors)
        .map(|(s, a)| notification("session_invite", Some(*a), Some(*s), None))
        .collect();

    let mut lookups = HashMap::new();
    for (i, (s, a)) in sessions.iter().zip(&actors).enumerate() {
        lookups.insert(
            ("sessions".to_string(), s.to_string()),
            Ok(json!({ "id": s, "title": format!("session {i}") })),
        );
        lookups.insert(
            ("profiles".to_string(), a.to_string()),
            Ok(json!({ "id": a, "username": format!("user{i}") })),
        );
    }

    // Earlier rows answer slower, so completion order is reversed.
    let first = sessions[0].to_string();
    let backend = routed(Value::Array(rows), lookups).with_delay(move |request| {
        match request {
            Request::Select(q) if q.table == "notifications" => Duration::ZERO,
            Request::Select(q) if q.eq_value("id") == Some(first.as_str()) => {
                Duration::from_millis(150)
            }
            _ => Duration::from_millis(100),
        }
    });

    let started = Instant::now();
    let list = notifications::fetch_notifications(&backend, Uuid::new_v4())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // Eight lookups of at least 100ms each would take 800ms+ one after another.
    assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    let titles: Vec<_> = list
        .iter()
        .map(|n| n.session.as_ref().unwrap().title.clone())
        .collect();
    assert_eq!(titles, ["session 0", "session 1", "session 2", "session 3"]);
    assert_eq!(list[2].user.as_ref().unwrap().username, "user2");
    assert_eq!(backend.calls().await.len(), 9);
}

#[tokio::test]
async fn create_notification_sends_nulls_for_missing_ids() {
    let (recipient, actor, created) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let backend = RecordingBackend::with_responses(vec![Ok(
        json!({ "success": true, "notification_id": created }),
    )]);

    let id = notifications::create_notification(
        &backend,
        NewNotification {
            recipient_id: recipient,
            kind: NotificationType::FriendRequest,
            actor_id: Some(actor),
            session_id: None,
            tag_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(id, Some(created));

    let calls = backend.calls().await;
    match &calls[0] {
        Request::Rpc { name, args } => {
            assert_eq!(name, "create_notification_safe");
            assert_eq!(
                args,
                &json!({
                    "recipient_id": recipient,
                    "type": "friend_request",
                    "actor_id": actor,
                    "session_id": null,
                    "tag_id": null,
                })
            );
        }
        other => panic!("expected rpc, got {other:?}"),
    }
}

#[tokio::test]
async fn mark_all_read_only_touches_unread() {
    let user = Uuid::new_v4();
    let backend = RecordingBackend::with_responses(vec![Ok(json!(null))]);

    notifications::mark_all_notifications_read(&backend, user)
        .await
        .unwrap();

    let calls = backend.calls().await;
    match &calls[0] {
        Request::Update { query, patch } => {
            assert_eq!(query.table, "notifications");
            assert!(query
                .filters
                .contains(&Filter::Is("read".into(), IsValue::False)));
            assert_eq!(patch, &json!({ "read": true }));
        }
        other => panic!("expected update, got {other:?}"),
    }
}
