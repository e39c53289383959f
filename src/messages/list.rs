use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    extract::{Json, Path, Query},
    models::{Message, MESSAGE_COLUMNS},
    session::CurrentUser,
    AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct InboxQuery {
    #[serde(default)]
    conversations: bool,
}

/// Everything the caller sent or received, newest first. With
/// `?conversations=true`, only the ids of the people on the other end.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn inbox(
    Query(InboxQuery { conversations }): Query<InboxQuery>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Response> {
    if conversations {
        return Ok(Json(counterparts(&db_pool, user.id).await?).into_response());
    }

    let messages: Vec<Message> = sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE from_user_id=? OR to_user_id=? \
         ORDER BY created_at DESC, id DESC"
    ))
        .bind(user.id)
        .bind(user.id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(messages).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversations(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Uuid>>> {
    Ok(Json(counterparts(&db_pool, user.id).await?))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn job_messages(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Message>>> {
    let messages = sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE job_id=? AND (from_user_id=? OR to_user_id=?) \
         ORDER BY created_at, id"
    ))
        .bind(job_id)
        .bind(user.id)
        .bind(user.id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(messages))
}

/// Distinct people the user has exchanged messages with, most recent first.
pub async fn counterparts(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT peer FROM ( \
            SELECT CASE WHEN from_user_id=? THEN to_user_id ELSE from_user_id END AS peer, \
                   MAX(id) AS latest \
            FROM messages \
            WHERE from_user_id=? OR to_user_id=? \
            GROUP BY peer \
         ) WHERE peer<>? ORDER BY latest DESC",
    )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(db_pool)
        .await?;
    Ok(rows.into_iter().map(|(peer,)| peer).collect())
}
