use axum::{debug_handler, extract::State};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{extract::{Json, Path}, session::AdminUser, AppError, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_bid(
    Path(bid_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<Value>> {
    let deleted = sqlx::query("DELETE FROM bids WHERE id=?")
        .bind(bid_id)
        .execute(&db_pool)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound("Bid"));
    }

    info!(%bid_id, deleted_by = %admin.id, "bid deleted");
    Ok(Json(json!({ "message": "Bid deleted" })))
}
