use std::sync::Arc;

use axum::{debug_handler, extract::State, http::HeaderMap};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    config::SESSION_SECRET_HEADER,
    extract::Json,
    models::{User, USER_COLUMNS},
    session::USER_ID,
    AppError, AppResult, Config,
};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
}

/// Binds the session to an account. Only the identity provider, which has
/// already verified the credentials, knows the shared secret this requires.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
    session: Session,
    Json(LoginRequest { email }): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    let Some(secret) = config.session_secret.as_deref() else {
        return Err(AppError::forbidden("Session login is disabled"));
    };
    let presented = headers
        .get(SESSION_SECRET_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if !same_secret(presented, secret.as_bytes()) {
        warn!("session login with a bad secret");
        return Err(AppError::Unauthorized);
    }

    let email = email.trim().to_lowercase();

    let Some(user) = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email=?"))
        .bind(&email)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("User"));
    };

    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;

    info!(user_id = %user.id, "welcome {}", user.name);
    Ok(Json(user))
}

/// Compares without stopping at the first differing byte.
fn same_secret(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len()
        && presented.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_must_match_exactly() {
        assert!(same_secret(b"hunter2", b"hunter2"));
        assert!(!same_secret(b"hunter3", b"hunter2"));
        assert!(!same_secret(b"hunter", b"hunter2"));
        assert!(!same_secret(b"", b"hunter2"));
    }
}
