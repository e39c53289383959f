mod new;
mod profile;

use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{models::{User, USER_COLUMNS}, AppResult, AppState};

pub use new::{create_user, seed_admin, NewUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(new::register))
        .route("/{id}", get(profile::profile))
}

/// The admin side, mounted under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(new::register_by_admin))
}

pub async fn find_user(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<User>> {
    Ok(
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
            .bind(user_id)
            .fetch_optional(db_pool)
            .await?
    )
}
