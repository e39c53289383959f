use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    jobs::find_job,
    models::{Bid, JobStatus, Role, User, BID_COLUMNS},
    session::CurrentUser,
    AppError, AppResult,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    /// Only read by `POST /api/bids`; the other route takes it from the path.
    #[serde(default)]
    pub job_id: Option<Uuid>,
    #[serde(alias = "amount", alias = "bidAmount")]
    pub bid_amount: f64,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub message: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_bid(
    State(db_pool): State<SqlitePool>,
    CurrentUser(bidder): CurrentUser,
    Json(new_bid): Json<NewBid>,
) -> AppResult<(StatusCode, Json<Bid>)> {
    let Some(job_id) = new_bid.job_id else {
        return Err(AppError::bad_request("job_id is required"));
    };
    let bid = create_bid(&db_pool, &bidder, job_id, new_bid).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_bid_for_job(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(bidder): CurrentUser,
    Json(new_bid): Json<NewBid>,
) -> AppResult<(StatusCode, Json<Bid>)> {
    let bid = create_bid(&db_pool, &bidder, job_id, new_bid).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

/// Every rejection happens before anything is written.
pub async fn create_bid(
    db_pool: &SqlitePool,
    bidder: &User,
    job_id: Uuid,
    NewBid { bid_amount, timeline, message, .. }: NewBid,
) -> AppResult<Bid> {
    if bidder.role != Role::Freelancer {
        return Err(AppError::forbidden("Only freelancers can bid"));
    }
    if !bid_amount.is_finite() || bid_amount <= 0.0 {
        return Err(AppError::bad_request("Bid amount must be a positive number"));
    }

    let Some(job) = find_job(db_pool, job_id).await? else {
        return Err(AppError::NotFound("Job"));
    };
    if job.assigned_to.is_some() {
        return Err(AppError::conflict("This job has already been assigned to a freelancer."));
    }
    if job.status != JobStatus::Open {
        return Err(AppError::conflict("Job is not open for bidding"));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM bids WHERE job_id=? AND user_id=?")
        .bind(job_id)
        .bind(bidder.id)
        .fetch_optional(db_pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("You already bid on this job"));
    }

    let result = sqlx::query_as::<_, Bid>(&format!(
        "INSERT INTO bids (id,job_id,user_id,bid_amount,timeline,message,status,created_at) \
         VALUES (?,?,?,?,?,?,'pending',?) RETURNING {BID_COLUMNS}"
    ))
        .bind(Uuid::now_v7())
        .bind(job_id)
        .bind(bidder.id)
        .bind(bid_amount)
        .bind(timeline.trim())
        .bind(message.trim())
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db_pool)
        .await;

    match result {
        Ok(bid) => {
            info!(bid_id = %bid.id, %job_id, user_id = %bidder.id, "bid placed");
            Ok(bid)
        }
        // lost the race against a concurrent bid from the same user
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::conflict("You already bid on this job"))
        }
        Err(e) => Err(e.into()),
    }
}
