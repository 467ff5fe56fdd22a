use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{NOTIFICATIONS, PROFILES, SESSIONS, TAGS};
use crate::backend::{Backend, Filter, IsValue, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::{NotificationPayload, NotificationRow};
use crate::error::DataResult;
use crate::fanout;
use crate::model::{NewNotification, Notification};
use crate::normalize::{call_procedure, execute, fetch_one, fetch_rows};

pub const NOTIFICATION_LIMIT: usize = 50;

/// Latest notifications for `user_id`, each enriched with actor, session and
/// tag summaries.
pub async fn fetch_notifications(
    backend: &dyn Backend,
    user_id: Uuid,
) -> DataResult<Vec<Notification>> {
    fetch_notifications_with_limit(backend, user_id, fanout::DEFAULT_CONCURRENCY).await
}

/// Like [`fetch_notifications`] with an explicit cap on rows enriched at once.
#[instrument(skip_all, fields(user_id = %user_id, max_concurrency = max_concurrency))]
pub async fn fetch_notifications_with_limit(
    backend: &dyn Backend,
    user_id: Uuid,
    max_concurrency: usize,
) -> DataResult<Vec<Notification>> {
    let query = Query::from(NOTIFICATIONS)
        .eq("user_id", user_id)
        .order("created_at", Order::Descending)
        .limit(NOTIFICATION_LIMIT);
    let rows: Vec<NotificationRow> =
        fetch_rows(backend, "fetch_notifications", Request::Select(query)).await?;
    debug!(count = rows.len(), "enriching notifications");

    fanout::bounded(rows, max_concurrency, |row| enrich(backend, row))
        .await
        .into_iter()
        .collect()
}

/// All three lookups for one row run together and are joined before the row
/// is assembled.
async fn enrich(backend: &dyn Backend, row: NotificationRow) -> DataResult<Notification> {
    let (user, session, tag) = futures::join!(
        lookup(
            backend,
            "fetch_notifications.actor",
            PROFILES,
            "id, username",
            row.actor_id,
            mappers::actor_from_row,
        ),
        lookup(
            backend,
            "fetch_notifications.session",
            SESSIONS,
            "id, title",
            row.session_id,
            mappers::session_summary_from_row,
        ),
        lookup(
            backend,
            "fetch_notifications.tag",
            TAGS,
            "id, name, color, emoji",
            row.tag_id,
            mappers::tag_summary_from_row,
        ),
    );
    Ok(mappers::notification_from_row(row, user?, session?, tag?))
}

/// A null id skips the round trip, and a referenced row that no longer exists
/// leaves the summary absent. Any other failure fails the whole list.
async fn lookup<R, T, F>(
    backend: &dyn Backend,
    operation: &'static str,
    table: &str,
    columns: &str,
    id: Option<Uuid>,
    map: F,
) -> DataResult<Option<T>>
where
    R: DeserializeOwned,
    F: FnOnce(R) -> T,
{
    let id = match id {
        Some(id) => id,
        None => return Ok(None),
    };
    let query = Query::from(table).select(columns).eq("id", id).single();
    match fetch_one::<R>(backend, operation, Request::Select(query)).await {
        Ok(row) => Ok(Some(map(row))),
        Err(err) if err.is_not_found() => {
            debug!(operation, %id, "referenced row is gone");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Returns the new notification's id when the procedure reports one.
#[instrument(skip_all, fields(recipient_id = %new.recipient_id, kind = new.kind.as_str()))]
pub async fn create_notification(
    backend: &dyn Backend,
    new: NewNotification,
) -> DataResult<Option<Uuid>> {
    let payload: NotificationPayload = call_procedure(
        backend,
        "create_notification",
        "create_notification_safe",
        json!({
            "recipient_id": new.recipient_id,
            "type": new.kind.as_str(),
            "actor_id": new.actor_id,
            "session_id": new.session_id,
            "tag_id": new.tag_id,
        }),
        "Failed to create notification",
    )
    .await?;
    Ok(payload.notification_id)
}

#[instrument(skip_all, fields(notification_id = %notification_id))]
pub async fn mark_notification_read(backend: &dyn Backend, notification_id: Uuid) -> DataResult<()> {
    let query = Query::from(NOTIFICATIONS).eq("id", notification_id);
    let patch = json!({ "read": true });
    execute(backend, "mark_notification_read", Request::Update { query, patch }).await
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn mark_all_notifications_read(backend: &dyn Backend, user_id: Uuid) -> DataResult<()> {
    let query = Query::from(NOTIFICATIONS)
        .eq("user_id", user_id)
        .filter(Filter::Is("read".into(), IsValue::False));
    let patch = json!({ "read": true });
    execute(backend, "mark_all_notifications_read", Request::Update { query, patch }).await
}
