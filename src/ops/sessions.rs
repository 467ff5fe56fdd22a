use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{to_json, SESSIONS, SESSION_COLUMNS};
use crate::backend::{Backend, Filter, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::{Ack, SessionRow};
use crate::error::DataResult;
use crate::model::{NewSession, ParticipantRole, Session, SessionPatch, SessionStatus};
use crate::normalize::{call_procedure, execute, fetch_one, fetch_rows};

pub const HISTORY_LIMIT: usize = 50;

/// Active sessions, latest event first.
#[instrument(skip_all)]
pub async fn fetch_active_sessions(backend: &dyn Backend) -> DataResult<Vec<Session>> {
    let query = Query::from(SESSIONS)
        .select(SESSION_COLUMNS)
        .eq("status", SessionStatus::Active.as_str())
        .order("event_time", Order::Descending);
    let rows: Vec<SessionRow> =
        fetch_rows(backend, "fetch_active_sessions", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::session_from_row).collect())
}

/// Closed sessions the user created or took part in, newest first.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_session_history(
    backend: &dyn Backend,
    user_id: Uuid,
) -> DataResult<Vec<Session>> {
    let user = user_id.to_string();
    let query = Query::from(SESSIONS)
        .select(SESSION_COLUMNS)
        .or(vec![
            Filter::Eq("created_by".into(), user.clone()),
            Filter::Contains("participants".into(), vec![user]),
        ])
        .eq("status", SessionStatus::Closed.as_str())
        .order("event_time", Order::Descending)
        .limit(HISTORY_LIMIT);
    let rows: Vec<SessionRow> =
        fetch_rows(backend, "fetch_session_history", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::session_from_row).collect())
}

#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn fetch_session(backend: &dyn Backend, session_id: Uuid) -> DataResult<Session> {
    let query = Query::from(SESSIONS)
        .select(SESSION_COLUMNS)
        .eq("id", session_id)
        .single();
    let row: SessionRow = fetch_one(backend, "fetch_session", Request::Select(query)).await?;
    Ok(mappers::session_from_row(row))
}

/// Insert a new active session with the creator as its first participant.
/// The returned row carries no embedded creator profile.
#[instrument(skip_all)]
pub async fn create_session(backend: &dyn Backend, new: NewSession) -> DataResult<Session> {
    let row = to_json("create_session", &mappers::session_insert(new))?;
    let created: SessionRow =
        fetch_one(backend, "create_session", Request::insert(SESSIONS, row)).await?;
    info!(session_id = %created.id, "session created");
    Ok(mappers::session_from_row(created))
}

#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn update_session(
    backend: &dyn Backend,
    session_id: Uuid,
    patch: SessionPatch,
) -> DataResult<Session> {
    let patch = to_json("update_session", &mappers::session_update(patch))?;
    let query = Query::from(SESSIONS)
        .select(SESSION_COLUMNS)
        .eq("id", session_id)
        .single();
    let row: SessionRow =
        fetch_one(backend, "update_session", Request::Update { query, patch }).await?;
    Ok(mappers::session_from_row(row))
}

/// Mark a session closed, optionally recording how it went.
#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn close_session(
    backend: &dyn Backend,
    session_id: Uuid,
    outcome: Option<String>,
) -> DataResult<Session> {
    let patch = SessionPatch {
        status: Some(SessionStatus::Closed),
        outcome,
        ..Default::default()
    };
    update_session(backend, session_id, patch).await
}

#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn delete_session(backend: &dyn Backend, session_id: Uuid) -> DataResult<()> {
    let query = Query::from(SESSIONS).eq("id", session_id);
    execute(backend, "delete_session", Request::Delete(query)).await
}

#[instrument(skip_all, fields(session_id = %session_id, user_id = %user_id))]
pub async fn join_session(
    backend: &dyn Backend,
    session_id: Uuid,
    user_id: Uuid,
    role: ParticipantRole,
) -> DataResult<()> {
    let _: Ack = call_procedure(
        backend,
        "join_session",
        "join_session_safe",
        json!({
            "session_id": session_id,
            "user_id": user_id,
            "role": role.as_str(),
        }),
        "Failed to join session",
    )
    .await?;
    Ok(())
}

#[instrument(skip_all, fields(session_id = %session_id, user_id = %user_id))]
pub async fn leave_session(
    backend: &dyn Backend,
    session_id: Uuid,
    user_id: Uuid,
) -> DataResult<()> {
    let _: Ack = call_procedure(
        backend,
        "leave_session",
        "leave_session_safe",
        json!({ "session_id": session_id, "user_id": user_id }),
        "Failed to leave session",
    )
    .await?;
    Ok(())
}
