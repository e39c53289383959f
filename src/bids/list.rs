use axum::{debug_handler, extract::State};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    models::{Bid, JobStatus},
    session::{AdminUser, CurrentUser},
    AppResult,
};

const BID_FIELDS: &str = "b.id AS id,b.job_id AS job_id,b.user_id AS user_id,b.bid_amount AS bid_amount,\
b.timeline AS timeline,b.message AS message,b.status AS status,b.created_at AS created_at";

#[derive(Debug, Serialize, FromRow)]
pub struct Bidder {
    #[sqlx(rename = "bidder_name")]
    pub name: String,
    #[sqlx(rename = "bidder_rating")]
    pub rating: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct JobBid {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bid: Bid,
    #[sqlx(flatten)]
    pub bidder: Bidder,
}

#[derive(Debug, Serialize, FromRow)]
pub struct BidJob {
    #[sqlx(rename = "job_title")]
    pub title: String,
    #[sqlx(rename = "job_budget")]
    pub budget: f64,
    #[sqlx(rename = "job_deadline")]
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    #[sqlx(rename = "job_status")]
    pub status: JobStatus,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MyBid {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bid: Bid,
    #[sqlx(flatten)]
    pub job: BidJob,
}

#[derive(Debug, Serialize, FromRow)]
pub struct AdminBid {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bid: Bid,
    pub job_title: String,
    pub bidder_name: String,
    pub bidder_email: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn job_bids(
    Path(job_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<JobBid>>> {
    let bids = sqlx::query_as(&format!(
        "SELECT {BID_FIELDS},u.name AS bidder_name,u.rating AS bidder_rating \
         FROM bids b JOIN users u ON u.id=b.user_id \
         WHERE b.job_id=? ORDER BY b.created_at DESC, b.id DESC"
    ))
        .bind(job_id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(bids))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_bids(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<MyBid>>> {
    let bids = sqlx::query_as(&format!(
        "SELECT {BID_FIELDS},j.title AS job_title,j.budget AS job_budget,\
         j.deadline AS job_deadline,j.status AS job_status \
         FROM bids b JOIN jobs j ON j.id=b.job_id \
         WHERE b.user_id=? ORDER BY b.created_at DESC, b.id DESC"
    ))
        .bind(user.id)
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(bids))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn all_bids(
    State(db_pool): State<SqlitePool>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<AdminBid>>> {
    let bids = sqlx::query_as(&format!(
        "SELECT {BID_FIELDS},j.title AS job_title,u.name AS bidder_name,u.email AS bidder_email \
         FROM bids b JOIN jobs j ON j.id=b.job_id JOIN users u ON u.id=b.user_id \
         ORDER BY b.created_at DESC, b.id DESC"
    ))
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(bids))
}
