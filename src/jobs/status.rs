use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Job, JobStatus, Role, JOB_COLUMNS},
    session::CurrentUser,
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    status: JobStatus,
}

/// Reopens or completes a job. Assignment has its own routes, and a completed
/// job stays completed.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_status(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(StatusUpdate { status }): Json<StatusUpdate>,
) -> AppResult<Json<Job>> {
    let Some(job) = super::find_job(&db_pool, job_id).await? else {
        return Err(AppError::NotFound("Job"));
    };
    if job.poster_id != user.id && user.role != Role::Admin {
        return Err(AppError::forbidden("Not authorized"));
    }
    if status == JobStatus::Assigned {
        return Err(AppError::bad_request("Assign a job by accepting a bid or through /assign"));
    }

    let Some(job) = sqlx::query_as::<_, Job>(&format!(
        "UPDATE jobs SET status=? WHERE id=? AND status<>'completed' RETURNING {JOB_COLUMNS}"
    ))
        .bind(status)
        .bind(job_id)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::conflict("Job is already completed"));
    };

    info!(%job_id, status = ?job.status, changed_by = %user.id, "job status changed");
    Ok(Json(job))
}
