use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Role, Task, TaskStatus, TASK_COLUMNS},
    session::CurrentUser,
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    status: TaskStatus,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_status(
    Path(task_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    Json(StatusUpdate { status }): Json<StatusUpdate>,
) -> AppResult<Json<Task>> {
    let Some(task): Option<Task> = sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id=?"))
        .bind(task_id)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("Task"));
    };
    if task.assigned_user_id != user.id && user.role != Role::Admin {
        return Err(AppError::forbidden("Not authorized"));
    }

    let task: Task = sqlx::query_as(&format!("UPDATE tasks SET status=? WHERE id=? RETURNING {TASK_COLUMNS}"))
        .bind(status)
        .bind(task_id)
        .fetch_one(&db_pool)
        .await?;

    info!(%task_id, status = ?task.status, "task moved");
    Ok(Json(task))
}
