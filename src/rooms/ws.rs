use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    msg::{ClientEvent, ServerEvent},
    Outbox, Rooms, OUTBOX_CAPACITY,
};

#[debug_handler(state = crate::AppState)]
pub async fn room_ws(State(rooms): State<Rooms>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |stream| serve_connection(stream, rooms))
}

async fn serve_connection(stream: WebSocket, rooms: Rooms) {
    let connection = Uuid::now_v7();
    info!(%connection, "socket connected");

    let (outbox, mut inbox) = mpsc::channel::<Arc<str>>(OUTBOX_CAPACITY);
    let (mut sender, mut receiver) = stream.split();

    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if sender.send(Message::Text(frame.as_ref().into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let Some(Ok(msg)) = incoming else {
                    break;
                };
                if let Message::Close(_) = msg {
                    break;
                }

                let Ok(event) = serde_json::from_slice::<ClientEvent>(&msg.into_data()) else {
                    debug!(%connection, "ignoring malformed frame");
                    continue;
                };

                handle_event(&rooms, connection, &outbox, event).await;
            }
            _ = &mut write_task => break,
        }
    }

    write_task.abort();
    let left = rooms.disconnect(connection).await;
    info!(%connection, rooms = left, "socket disconnected");
}

async fn handle_event(rooms: &Rooms, connection: Uuid, outbox: &Outbox, event: ClientEvent) {
    match event {
        ClientEvent::Join(room) => {
            rooms.subscribe(connection, &room, outbox.clone()).await;
            ack(outbox, ServerEvent::Joined(&room));
        }
        ClientEvent::Leave(room) => {
            rooms.unsubscribe(connection, &room).await;
            ack(outbox, ServerEvent::Left(&room));
        }
        ClientEvent::SendMessage(payload) => {
            match ServerEvent::ReceiveMessage(&payload).to_frame() {
                Ok(frame) => {
                    let delivered = rooms.publish(&payload.room, frame).await;
                    debug!(%connection, room = %payload.room, delivered, "message published");
                }
                Err(e) => warn!(%connection, "could not frame message: {e}"),
            }
        }
    }
}

fn ack(outbox: &Outbox, event: ServerEvent<'_>) {
    if let Ok(frame) = event.to_frame() {
        let _ = outbox.try_send(frame);
    }
}
