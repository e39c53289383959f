use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Job, Role, JOB_COLUMNS},
    session::CurrentUser,
    users::find_user,
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    freelancer_id: Uuid,
}

/// Hands the job to a freelancer directly, without going through a bid.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn assign(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(AssignRequest { freelancer_id }): Json<AssignRequest>,
) -> AppResult<Json<Job>> {
    let Some(job) = super::find_job(&db_pool, job_id).await? else {
        return Err(AppError::NotFound("Job"));
    };
    if job.poster_id != user.id && user.role != Role::Admin {
        return Err(AppError::forbidden("Not authorized"));
    }

    let (bid_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bids WHERE job_id=?")
        .bind(job_id)
        .fetch_one(&db_pool)
        .await?;
    if bid_count == 0 {
        return Err(AppError::conflict("A job must have at least one bid to be assigned."));
    }
    if job.assigned_to.is_some() {
        return Err(AppError::conflict("Job already assigned."));
    }
    if find_user(&db_pool, freelancer_id).await?.is_none() {
        return Err(AppError::NotFound("Freelancer"));
    }

    // the guard makes a concurrent assignment lose instead of overwrite
    let Some(job) = sqlx::query_as::<_, Job>(&format!(
        "UPDATE jobs SET assigned_to=?, status='assigned' WHERE id=? AND assigned_to IS NULL RETURNING {JOB_COLUMNS}"
    ))
        .bind(freelancer_id)
        .bind(job_id)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::conflict("Job already assigned."));
    };

    info!(%job_id, %freelancer_id, "job assigned");
    Ok(Json(job))
}
