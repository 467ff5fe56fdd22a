use tracing::instrument;
use uuid::Uuid;

use super::{to_json, PROFILES};
use crate::backend::{Backend, Order, Query, Request};
use crate::db::mappers;
use crate::db::rows::ProfileRow;
use crate::error::DataResult;
use crate::model::{Profile, ProfilePatch};
use crate::normalize::{fetch_one, fetch_rows};

pub const SEARCH_LIMIT: usize = 20;

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_profile(backend: &dyn Backend, user_id: Uuid) -> DataResult<Profile> {
    let query = Query::from(PROFILES).eq("id", user_id).single();
    let row: ProfileRow = fetch_one(backend, "fetch_profile", Request::Select(query)).await?;
    Ok(mappers::profile_from_row(row))
}

/// Case-insensitive username search. A blank term returns nothing without a
/// round trip.
#[instrument(skip_all)]
pub async fn search_profiles(backend: &dyn Backend, term: &str) -> DataResult<Vec<Profile>> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::from(PROFILES)
        .ilike("username", &format!("*{}*", term))
        .order("username", Order::Ascending)
        .limit(SEARCH_LIMIT);
    let rows: Vec<ProfileRow> =
        fetch_rows(backend, "search_profiles", Request::Select(query)).await?;
    Ok(rows.into_iter().map(mappers::profile_from_row).collect())
}

#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_profile(
    backend: &dyn Backend,
    user_id: Uuid,
    patch: ProfilePatch,
) -> DataResult<Profile> {
    let patch = to_json("update_profile", &mappers::profile_update(patch))?;
    let query = Query::from(PROFILES).eq("id", user_id).single();
    let row: ProfileRow =
        fetch_one(backend, "update_profile", Request::Update { query, patch }).await?;
    Ok(mappers::profile_from_row(row))
}
