//! Durable messages. Live chat goes through [`crate::rooms`] instead; the only
//! bridge between the two is [`announce`].

mod list;
mod read;
mod send;

use axum::{routing::{get, patch, post}, Router};
use time::format_description::well_known::Rfc3339;

use crate::{
    models::Message,
    rooms::{derive_room, ChatPayload, Rooms, ServerEvent},
    AppState,
};

pub use send::{send_message, NewMessage};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send::send).get(list::inbox))
        .route("/conversations", get(list::conversations))
        .route("/job/{job_id}", get(list::job_messages))
        .route("/{id}/read", patch(read::mark_read))
}

/// Pushes a stored message into the live room of its two parties.
/// Returns how many connections it reached; nobody listening is not an error.
pub async fn announce(rooms: &Rooms, message: &Message) -> usize {
    let from = message.from_user_id.to_string();
    let to = message.to_user_id.to_string();
    let room = derive_room(&from, &to);
    let time = message.created_at.format(&Rfc3339).unwrap_or_default();

    let payload = ChatPayload::new(room, message.content.clone(), from, to, time);
    match ServerEvent::ReceiveMessage(&payload).to_frame() {
        Ok(frame) => rooms.publish(&payload.room, frame).await,
        Err(_) => 0,
    }
}
