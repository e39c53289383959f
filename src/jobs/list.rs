use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{extract::{Json, Path}, models::{Job, JOB_COLUMNS}, session::CurrentUser, AppError, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn open_jobs(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Job>>> {
    let jobs = sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE status='open' ORDER BY created_at DESC, id DESC"
    ))
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(jobs))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_jobs(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Job>>> {
    let jobs = sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE poster_id=? ORDER BY created_at DESC, id DESC"
    ))
        .bind(user.id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(jobs))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn job(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Job>> {
    super::find_job(&db_pool, job_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Job"))
}
