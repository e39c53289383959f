use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::{types::Json as SqlJson, SqlitePool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::Json,
    models::{Role, User, USER_COLUMNS},
    session::AdminUser,
    AppError, AppResult,
};

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: String,
}

/// Registration only records who someone is. Proving it is left to the
/// identity provider in front of `/api/auth/session`.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Json(new_user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    if new_user.role == Role::Admin {
        return Err(AppError::forbidden("Admin accounts are created by an admin"));
    }
    let user = create_user(&db_pool, new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register_by_admin(
    State(db_pool): State<SqlitePool>,
    AdminUser(admin): AdminUser,
    Json(new_user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = create_user(&db_pool, new_user).await?;
    info!(user_id = %user.id, created_by = %admin.id, "account created by admin");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Creates the admin account for `email` unless that email is already taken.
pub async fn seed_admin(db_pool: &SqlitePool, email: &str) -> AppResult<()> {
    let email = email.trim().to_lowercase();
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email=?")
        .bind(&email)
        .fetch_optional(db_pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let new_admin = NewUser {
        name: "Admin".to_owned(),
        email,
        role: Role::Admin,
        skills: Vec::new(),
        bio: String::new(),
    };
    create_user(db_pool, new_admin).await?;
    Ok(())
}

pub async fn create_user(db_pool: &SqlitePool, NewUser { name, email, role, skills, bio }: NewUser) -> AppResult<User> {
    let name = name.trim().to_owned();
    let email = email.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }

    let skills: Vec<String> = skills
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();

    let result = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id,name,email,role,skills,bio,rating,created_at) VALUES (?,?,?,?,?,?,0,?) RETURNING {USER_COLUMNS}"
    ))
        .bind(Uuid::now_v7())
        .bind(&name)
        .bind(&email)
        .bind(role)
        .bind(SqlJson(skills))
        .bind(bio)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db_pool)
        .await;

    match result {
        Ok(user) => {
            info!(user_id = %user.id, role = ?user.role, "registered {name}");
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::conflict("Email already registered"))
        }
        Err(e) => Err(e.into()),
    }
}
