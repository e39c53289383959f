use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::Json,
    jobs::find_job,
    models::{Message, User, MESSAGE_COLUMNS},
    session::CurrentUser,
    users::find_user,
    AppError, AppResult,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    #[serde(alias = "jobId")]
    pub job_id: Uuid,
    #[serde(alias = "toUserId")]
    pub to_user_id: Uuid,
    pub content: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    CurrentUser(sender): CurrentUser,
    Json(new_message): Json<NewMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = send_message(&db_pool, &sender, new_message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Only someone bidding on the job, or the freelancer it is assigned to, may
/// write about it.
pub async fn send_message(
    db_pool: &SqlitePool,
    sender: &User,
    NewMessage { job_id, to_user_id, content }: NewMessage,
) -> AppResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("Message content is required"));
    }

    let Some(job) = find_job(db_pool, job_id).await? else {
        return Err(AppError::NotFound("Job"));
    };

    let is_bidder: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM bids WHERE job_id=? AND user_id=?")
        .bind(job_id)
        .bind(sender.id)
        .fetch_optional(db_pool)
        .await?;
    let is_assigned = job.assigned_to == Some(sender.id);
    if is_bidder.is_none() && !is_assigned {
        return Err(AppError::forbidden(
            "You can only message on jobs you are bidding on or assigned to.",
        ));
    }

    if find_user(db_pool, to_user_id).await?.is_none() {
        return Err(AppError::NotFound("Recipient"));
    }

    let message: Message = sqlx::query_as(&format!(
        "INSERT INTO messages (id,job_id,from_user_id,to_user_id,content,is_read,created_at) \
         VALUES (?,?,?,?,?,0,?) RETURNING {MESSAGE_COLUMNS}"
    ))
        .bind(Uuid::now_v7())
        .bind(job_id)
        .bind(sender.id)
        .bind(to_user_id)
        .bind(content)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db_pool)
        .await?;

    info!(message_id = %message.id, %job_id, from = %sender.id, to = %to_user_id, "message stored");
    Ok(message)
}
