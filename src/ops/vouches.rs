use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::backend::{Backend, Request};
use crate::db::mappers;
use crate::db::rows::{VouchHistoryRow, VouchPayload};
use crate::error::DataResult;
use crate::model::{Vouch, VouchReceipt};
use crate::normalize::{call_procedure, fetch_rows};

/// Endorse `receiver_id` for `skill` shown in `session_id`. The procedure
/// validates the pairing and awards the points.
#[instrument(skip_all, fields(voucher_id = %voucher_id, receiver_id = %receiver_id))]
pub async fn create_vouch(
    backend: &dyn Backend,
    voucher_id: Uuid,
    receiver_id: Uuid,
    session_id: Uuid,
    skill: &str,
) -> DataResult<VouchReceipt> {
    let payload: VouchPayload = call_procedure(
        backend,
        "create_vouch",
        "create_vouch_safe",
        json!({
            "voucher_id": voucher_id,
            "receiver_id": receiver_id,
            "session_id": session_id,
            "skill": skill,
        }),
        "Failed to create vouch",
    )
    .await?;
    info!(points = ?payload.points_awarded, "vouch recorded");
    Ok(mappers::vouch_receipt(payload))
}

/// History comes back as a plain list, with no success envelope.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn fetch_vouch_history(backend: &dyn Backend, user_id: Uuid) -> DataResult<Vec<Vouch>> {
    let request = Request::rpc("get_user_vouch_history", json!({ "user_id": user_id }));
    let rows: Vec<VouchHistoryRow> = fetch_rows(backend, "fetch_vouch_history", request).await?;
    Ok(rows.into_iter().map(mappers::vouch_from_row).collect())
}
