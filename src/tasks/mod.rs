mod list;
mod status;

use axum::{routing::{get, put}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/job/{job_id}", get(list::job_tasks))
        .route("/{id}/status", put(status::update_status))
}
