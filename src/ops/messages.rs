use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{to_json, CONVERSATIONS, DIRECT_MESSAGES, SESSION_MESSAGES};
use crate::backend::{Backend, Filter, IsValue, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::{
    ConversationIdPayload, ConversationRow, DirectMessageInsert, DirectMessageRow,
    SessionMessageInsert, SessionMessageRow,
};
use crate::error::DataResult;
use crate::model::{Conversation, DirectMessage, SessionMessage};
use crate::normalize::{
    decode, execute, fetch_count, fetch_one, fetch_rows, handle, unwrap_procedure,
};

// Session chat

/// Chat history of a session, oldest first.
#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn fetch_session_messages(
    backend: &dyn Backend,
    session_id: Uuid,
) -> DataResult<Vec<SessionMessage>> {
    let query = Query::from(SESSION_MESSAGES)
        .select("*, sender:profiles!sender_id(username)")
        .eq("session_id", session_id)
        .order("created_at", Order::Ascending);
    let rows: Vec<SessionMessageRow> =
        fetch_rows(backend, "fetch_session_messages", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::session_message_from_row).collect())
}

#[instrument(skip_all, fields(session_id = %session_id, sender_id = %sender_id))]
pub async fn send_session_message(
    backend: &dyn Backend,
    session_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> DataResult<SessionMessage> {
    let row = to_json(
        "send_session_message",
        &SessionMessageInsert {
            session_id,
            sender_id,
            content: content.to_string(),
        },
    )?;
    let created: SessionMessageRow =
        fetch_one(backend, "send_session_message", Request::insert(SESSION_MESSAGES, row)).await?;
    Ok(mappers::session_message_from_row(created))
}

// Direct conversations

/// The procedure returns only an id, either bare or inside a
/// `{success, conversation_id}` envelope; the row itself is a second fetch. A
/// failing procedure skips the fetch.
#[instrument(skip_all, fields(user_a = %user_a, user_b = %user_b))]
pub async fn get_or_create_conversation(
    backend: &dyn Backend,
    user_a: Uuid,
    user_b: Uuid,
) -> DataResult<Conversation> {
    const OPERATION: &str = "get_or_create_conversation";
    let request = Request::rpc(
        "get_or_create_conversation",
        json!({ "user_id_1": user_a, "user_id_2": user_b }),
    );
    let conversation_id: Uuid = match handle(OPERATION, backend.execute(&request)).await? {
        id @ Value::String(_) => decode(OPERATION, id)?,
        envelope => {
            let payload: ConversationIdPayload =
                unwrap_procedure(OPERATION, envelope, "Failed to open conversation")?;
            payload.conversation_id
        }
    };

    let query = Query::from(CONVERSATIONS)
        .eq("id", conversation_id)
        .single();
    let row: ConversationRow = fetch_one(
        backend,
        "get_or_create_conversation.fetch",
        Request::Select(query),
    )
    .await?;
    info!(conversation_id = %row.id, "conversation ready");
    Ok(mappers::conversation_from_row(row))
}

/// Conversations the user is part of, most recently active first.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_conversations(
    backend: &dyn Backend,
    user_id: Uuid,
) -> DataResult<Vec<Conversation>> {
    let user = user_id.to_string();
    let query = Query::from(CONVERSATIONS)
        .or(vec![
            Filter::Eq("user1_id".into(), user.clone()),
            Filter::Eq("user2_id".into(), user),
        ])
        .order("updated_at", Order::Descending);
    let rows: Vec<ConversationRow> =
        fetch_rows(backend, "fetch_conversations", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::conversation_from_row).collect())
}

#[instrument(skip_all, fields(conversation_id = %conversation_id))]
pub async fn fetch_direct_messages(
    backend: &dyn Backend,
    conversation_id: Uuid,
) -> DataResult<Vec<DirectMessage>> {
    let query = Query::from(DIRECT_MESSAGES)
        .eq("conversation_id", conversation_id)
        .order("created_at", Order::Ascending);
    let rows: Vec<DirectMessageRow> =
        fetch_rows(backend, "fetch_direct_messages", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::direct_message_from_row).collect())
}

#[instrument(skip_all, fields(conversation_id = %conversation_id, sender_id = %sender_id))]
pub async fn send_direct_message(
    backend: &dyn Backend,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> DataResult<DirectMessage> {
    let row = to_json(
        "send_direct_message",
        &DirectMessageInsert {
            conversation_id,
            sender_id,
            content: content.to_string(),
        },
    )?;
    let created: DirectMessageRow =
        fetch_one(backend, "send_direct_message", Request::insert(DIRECT_MESSAGES, row)).await?;
    Ok(mappers::direct_message_from_row(created))
}

fn unread_from_others(conversation_id: Uuid, user_id: Uuid) -> Query {
    Query::from(DIRECT_MESSAGES)
        .eq("conversation_id", conversation_id)
        .neq("sender_id", user_id)
        .filter(Filter::Is("read".into(), IsValue::False))
}

/// Messages in the conversation sent by the other participant and not yet
/// read. Counted by the server, so row caps do not truncate it.
#[instrument(skip_all, fields(conversation_id = %conversation_id, user_id = %user_id))]
pub async fn count_unread_messages(
    backend: &dyn Backend,
    conversation_id: Uuid,
    user_id: Uuid,
) -> DataResult<u32> {
    let query = unread_from_others(conversation_id, user_id).select("id");
    let count = fetch_count(backend, "count_unread_messages", query).await?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

#[instrument(skip_all, fields(conversation_id = %conversation_id, user_id = %user_id))]
pub async fn mark_conversation_read(
    backend: &dyn Backend,
    conversation_id: Uuid,
    user_id: Uuid,
) -> DataResult<()> {
    let query = unread_from_others(conversation_id, user_id);
    let patch = json!({ "read": true });
    execute(backend, "mark_conversation_read", Request::Update { query, patch }).await
}
