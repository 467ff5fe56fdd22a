use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{to_json, TAGS};
use crate::backend::{Backend, Filter, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::TagRow;
use crate::error::DataResult;
use crate::model::{NewTag, Tag};
use crate::normalize::{execute, fetch_one, fetch_rows};

/// Tags the user created or is a member of.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_tags(backend: &dyn Backend, user_id: Uuid) -> DataResult<Vec<Tag>> {
    let user = user_id.to_string();
    let query = Query::from(TAGS)
        .or(vec![
            Filter::Eq("created_by".into(), user.clone()),
            Filter::Contains("members".into(), vec![user]),
        ])
        .order("name", Order::Ascending);
    let rows: Vec<TagRow> = fetch_rows(backend, "fetch_tags", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::tag_from_row).collect())
}

#[instrument(skip_all)]
pub async fn create_tag(backend: &dyn Backend, new: NewTag) -> DataResult<Tag> {
    let row = to_json("create_tag", &mappers::tag_insert(new))?;
    let created: TagRow = fetch_one(backend, "create_tag", Request::insert(TAGS, row)).await?;
    Ok(mappers::tag_from_row(created))
}

#[instrument(skip_all, fields(tag_id = %tag_id))]
pub async fn delete_tag(backend: &dyn Backend, tag_id: Uuid) -> DataResult<()> {
    let query = Query::from(TAGS).eq("id", tag_id);
    execute(backend, "delete_tag", Request::Delete(query)).await
}

async fn fetch_tag_row(backend: &dyn Backend, operation: &'static str, tag_id: Uuid) -> DataResult<TagRow> {
    let query = Query::from(TAGS).eq("id", tag_id).single();
    fetch_one(backend, operation, Request::Select(query)).await
}

async fn write_members(
    backend: &dyn Backend,
    operation: &'static str,
    tag_id: Uuid,
    members: Vec<Uuid>,
) -> DataResult<Tag> {
    let query = Query::from(TAGS).eq("id", tag_id).single();
    let patch = json!({ "members": members });
    let row: TagRow = fetch_one(backend, operation, Request::Update { query, patch }).await?;
    Ok(mappers::tag_from_row(row))
}

/// Read the member list, append `member_id`, write it back. Already-present
/// members cost only the read.
#[instrument(skip_all, fields(tag_id = %tag_id, member_id = %member_id))]
pub async fn add_tag_member(backend: &dyn Backend, tag_id: Uuid, member_id: Uuid) -> DataResult<Tag> {
    let current = mappers::tag_from_row(fetch_tag_row(backend, "add_tag_member.fetch", tag_id).await?);
    if current.members.contains(&member_id) {
        debug!("already a member");
        return Ok(current);
    }
    let mut members = current.members;
    members.push(member_id);
    write_members(backend, "add_tag_member.update", tag_id, members).await
}

#[instrument(skip_all, fields(tag_id = %tag_id, member_id = %member_id))]
pub async fn remove_tag_member(
    backend: &dyn Backend,
    tag_id: Uuid,
    member_id: Uuid,
) -> DataResult<Tag> {
    let current =
        mappers::tag_from_row(fetch_tag_row(backend, "remove_tag_member.fetch", tag_id).await?);
    if !current.members.contains(&member_id) {
        debug!("not a member");
        return Ok(current);
    }
    let members = current.members.into_iter().filter(|m| *m != member_id).collect();
    write_members(backend, "remove_tag_member.update", tag_id, members).await
}
