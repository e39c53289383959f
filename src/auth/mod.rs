mod login;
mod logout;
mod me;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(login::login).delete(logout::logout))
        .route("/me", get(me::me))
}
