//! Bidding on jobs, and the workflow that settles a job on one bid.

mod accept;
mod delete;
mod list;
mod new;
mod withdraw;

use axum::{routing::{delete, get, post}, Router};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::{models::{Bid, BID_COLUMNS}, AppResult, AppState};

pub use accept::{accept_bid, Acceptance, ACCEPTANCE_NOTICE};
pub use new::{create_bid, NewBid};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(new::new_bid))
        .route("/my-bids", get(list::my_bids))
        .route("/job/{job_id}", get(list::job_bids))
        .route("/{id}", post(new::new_bid_for_job).delete(withdraw::withdraw))
}

/// The admin side, mounted under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/bids", get(list::all_bids))
        .route("/bids/{id}", delete(delete::delete_bid))
        .route("/bids/{id}/accept", post(accept::accept))
}

pub async fn find_bid<'e, E: SqliteExecutor<'e>>(db: E, bid_id: Uuid) -> AppResult<Option<Bid>> {
    Ok(
        sqlx::query_as(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id=?"))
            .bind(bid_id)
            .fetch_optional(db)
            .await?
    )
}
