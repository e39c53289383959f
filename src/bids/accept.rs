use axum::{debug_handler, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    extract::{Json, Path},
    jobs::find_job,
    messages::announce,
    models::{Bid, JobStatus, Message, Task, BID_COLUMNS, MESSAGE_COLUMNS, TASK_COLUMNS},
    rooms::Rooms,
    session::AdminUser,
    AppError, AppResult,
};

pub const ACCEPTANCE_NOTICE: &str = "Congratulations! Your bid for the job has been accepted by the admin. \
Please check your dashboard for further details.";

/// Everything one acceptance produced.
#[derive(Debug, Clone, Serialize)]
pub struct Acceptance {
    pub bid: Bid,
    pub task: Task,
    /// Absent when there is no admin account to send it from.
    pub notification: Option<Message>,
    /// How many competing bids were deleted.
    pub rejected: u64,
}

#[derive(Serialize)]
struct Accepted {
    message: &'static str,
    #[serde(flatten)]
    acceptance: Acceptance,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn accept(
    Path(bid_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(rooms): State<Rooms>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<impl Serialize>> {
    let acceptance = accept_bid(&db_pool, bid_id).await?;
    info!(%bid_id, accepted_by = %admin.id, "bid accepted");

    if let Some(notice) = &acceptance.notification {
        announce(&rooms, notice).await;
    }

    Ok(Json(Accepted {
        message: "Bid accepted and other bids deleted",
        acceptance,
    }))
}

/// Settles a job on one bid.
///
/// In a single transaction: marks the bid accepted, assigns the job to the
/// bidder, deletes every competing bid, leaves the bidder a notice from the
/// admin account (if there is one) and opens a task for them. Nothing is kept
/// if any step fails.
///
/// Only a pending bid can be accepted, and that check is the first write.
/// Two acceptances racing on one job are serialized by it: the winner deletes
/// the loser's bid, so the loser finds nothing to accept and gets `NotFound`.
pub async fn accept_bid(db_pool: &SqlitePool, bid_id: Uuid) -> AppResult<Acceptance> {
    let mut tx = db_pool.begin().await?;

    let accepted: Option<Bid> = sqlx::query_as(&format!(
        "UPDATE bids SET status='accepted' WHERE id=? AND status='pending' RETURNING {BID_COLUMNS}"
    ))
        .bind(bid_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(bid) = accepted else {
        return Err(match super::find_bid(&mut *tx, bid_id).await? {
            None => AppError::NotFound("Bid"),
            Some(_) => AppError::conflict("Bid already accepted"),
        });
    };

    let Some(job) = find_job(&mut *tx, bid.job_id).await? else {
        return Err(AppError::NotFound("Job"));
    };
    if job.status == JobStatus::Completed {
        return Err(AppError::conflict("Job is already completed"));
    }
    if job.assigned_to.is_some_and(|assignee| assignee != bid.user_id) {
        return Err(AppError::conflict("This job has already been assigned to a freelancer."));
    }

    sqlx::query("UPDATE jobs SET status='assigned', assigned_to=? WHERE id=?")
        .bind(bid.user_id)
        .bind(job.id)
        .execute(&mut *tx)
        .await?;

    let rejected = sqlx::query("DELETE FROM bids WHERE job_id=? AND id<>?")
        .bind(bid.job_id)
        .bind(bid.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let now = OffsetDateTime::now_utc();

    let admin: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE role='admin' ORDER BY created_at, id LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;

    let notification = match admin {
        Some((admin_id,)) => Some(
            sqlx::query_as::<_, Message>(&format!(
                "INSERT INTO messages (id,job_id,from_user_id,to_user_id,content,is_read,created_at) \
                 VALUES (?,?,?,?,?,0,?) RETURNING {MESSAGE_COLUMNS}"
            ))
                .bind(Uuid::now_v7())
                .bind(bid.job_id)
                .bind(admin_id)
                .bind(bid.user_id)
                .bind(ACCEPTANCE_NOTICE)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?,
        ),
        None => {
            warn!(%bid_id, "no admin account, skipping acceptance notice");
            None
        }
    };

    let task: Task = sqlx::query_as(&format!(
        "INSERT INTO tasks (id,job_id,title,assigned_user_id,status,created_at) \
         VALUES (?,?,?,?,'todo',?) RETURNING {TASK_COLUMNS}"
    ))
        .bind(Uuid::now_v7())
        .bind(bid.job_id)
        .bind(format!("Task for job: {}", bid.job_id))
        .bind(bid.user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        %bid_id,
        job_id = %bid.job_id,
        user_id = %bid.user_id,
        task_id = %task.id,
        rejected,
        "job settled"
    );

    Ok(Acceptance { bid, task, notification, rejected })
}
