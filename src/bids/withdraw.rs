use axum::{debug_handler, extract::State};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::BidStatus,
    session::CurrentUser,
    AppError, AppResult,
};

/// A freelancer takes back their own bid while it is still pending.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn withdraw(
    Path(bid_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Value>> {
    let Some(bid) = super::find_bid(&db_pool, bid_id).await? else {
        return Err(AppError::NotFound("Bid"));
    };
    if bid.user_id != user.id {
        return Err(AppError::forbidden("Not authorized"));
    }
    if bid.status != BidStatus::Pending {
        return Err(AppError::conflict("An accepted bid cannot be withdrawn"));
    }

    // an acceptance may have landed since the read
    let withdrawn = sqlx::query("DELETE FROM bids WHERE id=? AND status='pending'")
        .bind(bid_id)
        .execute(&db_pool)
        .await?
        .rows_affected();
    if withdrawn == 0 {
        return Err(AppError::conflict("An accepted bid cannot be withdrawn"));
    }

    info!(%bid_id, user_id = %user.id, "bid withdrawn");
    Ok(Json(json!({ "message": "Bid withdrawn" })))
}
