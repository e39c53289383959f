use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{extract::{Json, Path}, models::User, AppError, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    Path(user_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<User>> {
    let Some(user) = super::find_user(&db_pool, user_id).await? else {
        return Err(AppError::NotFound("User"));
    };
    Ok(Json(user))
}
