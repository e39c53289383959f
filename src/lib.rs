pub mod appresult;
pub mod auth;
pub mod bids;
pub mod config;
pub mod db;
pub mod extract;
pub mod jobs;
pub mod messages;
pub mod models;
pub mod rooms;
pub mod session;
pub mod tasks;
pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::FromRef,
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use rooms::Rooms;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    /// Created with the state and dropped with it at shutdown.
    pub rooms: Rooms,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> Self {
        Self {
            db_pool,
            rooms: Rooms::new(),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(state.config.session_idle()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/", get(health))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/jobs", jobs::router())
        .nest("/bids", bids::router())
        .nest("/admin", bids::admin_router().merge(users::admin_router()))
        .nest("/messages", messages::router())
        .nest("/tasks", tasks::router());

    Router::new()
        .nest("/api", api)
        .merge(rooms::router())
        .with_state(state)
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "API is running"
}
