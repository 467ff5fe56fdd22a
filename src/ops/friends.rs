use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{to_json, FRIENDSHIPS, FRIEND_REQUESTS, PROFILES};
use crate::backend::{Backend, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::{Ack, FriendRequestInsert, FriendRequestRow, FriendshipRow, ProfileRow};
use crate::error::DataResult;
use crate::model::{Friend, FriendRequest};
use crate::normalize::{call_procedure, execute, fetch_one, fetch_rows};

/// Two steps: friend ids from `friendships`, then their profiles in one
/// batch. No friendships means no second request.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_friends(backend: &dyn Backend, user_id: Uuid) -> DataResult<Vec<Friend>> {
    let query = Query::from(FRIENDSHIPS)
        .select("friend_id")
        .eq("user_id", user_id);
    let links: Vec<FriendshipRow> =
        fetch_rows(backend, "fetch_friends.ids", Request::Select(query)).await?;
    if links.is_empty() {
        debug!("no friendships");
        return Ok(Vec::new());
    }

    let ids = links.iter().map(|l| l.friend_id);
    let query = Query::from(PROFILES)
        .is_in("id", ids)
        .order("username", Order::Ascending);
    let rows: Vec<ProfileRow> =
        fetch_rows(backend, "fetch_friends.profiles", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::friend_from_row).collect())
}

/// Delete both directions of the friendship, `(user, friend)` first. If the
/// first delete fails the second is not attempted; nothing is rolled back.
#[instrument(skip_all, fields(user_id = %user_id, friend_id = %friend_id))]
pub async fn remove_friend(backend: &dyn Backend, user_id: Uuid, friend_id: Uuid) -> DataResult<()> {
    let forward = Query::from(FRIENDSHIPS)
        .eq("user_id", user_id)
        .eq("friend_id", friend_id);
    execute(backend, "remove_friend.forward", Request::Delete(forward)).await?;

    let reverse = Query::from(FRIENDSHIPS)
        .eq("user_id", friend_id)
        .eq("friend_id", user_id);
    execute(backend, "remove_friend.reverse", Request::Delete(reverse)).await?;
    info!("friendship removed");
    Ok(())
}

#[instrument(skip_all, fields(sender_id = %sender_id, receiver_id = %receiver_id))]
pub async fn send_friend_request(
    backend: &dyn Backend,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> DataResult<FriendRequest> {
    let row = to_json(
        "send_friend_request",
        &FriendRequestInsert {
            sender_id,
            receiver_id,
        },
    )?;
    let created: FriendRequestRow =
        fetch_one(backend, "send_friend_request", Request::insert(FRIEND_REQUESTS, row)).await?;
    Ok(mappers::friend_request_from_row(created))
}

/// Requests waiting for `user_id` to answer, newest first.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_friend_requests(
    backend: &dyn Backend,
    user_id: Uuid,
) -> DataResult<Vec<FriendRequest>> {
    let query = Query::from(FRIEND_REQUESTS)
        .select("*, sender:profiles!sender_id(username)")
        .eq("receiver_id", user_id)
        .order("created_at", Order::Descending);
    let rows: Vec<FriendRequestRow> =
        fetch_rows(backend, "fetch_friend_requests", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::friend_request_from_row).collect())
}

#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn accept_friend_request(backend: &dyn Backend, request_id: Uuid) -> DataResult<()> {
    let _: Ack = call_procedure(
        backend,
        "accept_friend_request",
        "accept_friend_request",
        json!({ "request_id": request_id }),
        "Failed to accept friend request",
    )
    .await?;
    Ok(())
}

#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn reject_friend_request(backend: &dyn Backend, request_id: Uuid) -> DataResult<()> {
    let query = Query::from(FRIEND_REQUESTS).eq("id", request_id);
    execute(backend, "reject_friend_request", Request::Delete(query)).await
}
