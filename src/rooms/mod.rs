//! Two-party real-time chat.
//!
//! A room is named by [`derive_room`] from the two participant ids. Membership
//! only lives in [`Rooms`] for as long as a socket stays connected; nothing here
//! touches the database.

mod msg;
mod registry;
mod room;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use msg::{ChatPayload, ServerEvent};
pub use registry::{ConnectionId, Outbox, Rooms, OUTBOX_CAPACITY};
pub use room::{derive_room, SEPARATOR};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::room_ws))
}
