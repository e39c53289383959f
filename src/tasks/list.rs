use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Task, TASK_COLUMNS},
    session::CurrentUser,
    AppResult,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn job_tasks(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = sqlx::query_as(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE job_id=? ORDER BY created_at, id"
    ))
        .bind(job_id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(tasks))
}
