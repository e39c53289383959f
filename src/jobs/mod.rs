mod assign;
mod list;
mod new;
mod status;

use axum::{routing::{get, patch, post, put}, Router};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::{models::{Job, JOB_COLUMNS}, AppResult, AppState};

pub use new::{create_job, NewJob};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(new::new_job).get(list::open_jobs))
        .route("/my-jobs", get(list::my_jobs))
        .route("/{id}", get(list::job))
        .route("/{id}/assign", patch(assign::assign))
        .route("/{id}/status", put(status::update_status))
}

pub async fn find_job<'e, E: SqliteExecutor<'e>>(db: E, job_id: Uuid) -> AppResult<Option<Job>> {
    Ok(
        sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id=?"))
            .bind(job_id)
            .fetch_optional(db)
            .await?
    )
}
