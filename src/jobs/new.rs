use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{extract::Json, models::{Job, JOB_COLUMNS}, session::AdminUser, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub budget: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    pub category: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_job(
    State(db_pool): State<SqlitePool>,
    AdminUser(poster): AdminUser,
    Json(new_job): Json<NewJob>,
) -> AppResult<(StatusCode, Json<Job>)> {
    let job = create_job(&db_pool, poster.id, new_job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn create_job(
    db_pool: &SqlitePool,
    poster_id: Uuid,
    NewJob { title, description, budget, deadline, category }: NewJob,
) -> AppResult<Job> {
    let title = title.trim();
    if title.is_empty() || description.trim().is_empty() || category.trim().is_empty() {
        return Err(AppError::bad_request("Title, description and category are required"));
    }
    if budget < 1.0 {
        return Err(AppError::bad_request("Budget must be at least 1"));
    }

    let job: Job = sqlx::query_as(&format!(
        "INSERT INTO jobs (id,title,description,budget,deadline,category,status,poster_id,created_at) \
         VALUES (?,?,?,?,?,?,'open',?,?) RETURNING {JOB_COLUMNS}"
    ))
        .bind(Uuid::now_v7())
        .bind(title)
        .bind(description.trim())
        .bind(budget)
        .bind(deadline)
        .bind(category.trim())
        .bind(poster_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db_pool)
        .await?;

    info!(job_id = %job.id, %poster_id, "job posted");
    Ok(job)
}
