use axum::debug_handler;

use crate::{extract::Json, models::User, session::CurrentUser};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
