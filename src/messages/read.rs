use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Message, MESSAGE_COLUMNS},
    session::CurrentUser,
    AppError, AppResult,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn mark_read(
    Path(message_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Message>> {
    let Some((to_user_id,)): Option<(Uuid,)> = sqlx::query_as("SELECT to_user_id FROM messages WHERE id=?")
        .bind(message_id)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("Message"));
    };
    if to_user_id != user.id {
        return Err(AppError::forbidden("Only the recipient can mark a message read"));
    }

    let message = sqlx::query_as(&format!(
        "UPDATE messages SET is_read=1 WHERE id=? RETURNING {MESSAGE_COLUMNS}"
    ))
        .bind(message_id)
        .fetch_one(&db_pool)
        .await?;
    Ok(Json(message))
}
