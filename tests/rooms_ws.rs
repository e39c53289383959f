mod common;

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use common::TestApp;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (SocketAddr, TestApp) {
    let t = TestApp::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = t.app.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, t)
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.expect("websocket handshake");
    ws
}

async fn emit(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(frame)).await.unwrap();
}

async fn next_event(ws: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn join(ws: &mut Client, room: &str) {
    emit(ws, "join", json!(room)).await;
    assert_eq!(next_event(ws).await, json!({ "event": "joined", "data": room }));
}

async fn stays_quiet(ws: &mut Client) -> bool {
    timeout(Duration::from_millis(200), ws.next()).await.is_err()
}

#[tokio::test]
async fn both_members_receive_including_the_sender() {
    let (addr, _t) = serve().await;
    let mut admin = connect(addr).await;
    let mut fay = connect(addr).await;
    let mut finn = connect(addr).await;

    join(&mut admin, "admin_F1").await;
    join(&mut fay, "admin_F1").await;
    join(&mut finn, "admin_F2").await;

    let payload = json!({
        "room": "admin_F1",
        "message": "Can you start Monday?",
        "sender": "admin",
        "receiver": "F1",
        "time": "09:15:02",
    });
    emit(&mut admin, "send_message", payload.clone()).await;

    let expected = json!({ "event": "receive_message", "data": payload });
    assert_eq!(next_event(&mut admin).await, expected);
    assert_eq!(next_event(&mut fay).await, expected);
    assert!(stays_quiet(&mut finn).await, "another room must not see it");
}

#[tokio::test]
async fn leaving_stops_delivery() {
    let (addr, t) = serve().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    join(&mut a, "a_b").await;
    join(&mut b, "a_b").await;

    emit(&mut b, "leave", json!("a_b")).await;
    assert_eq!(next_event(&mut b).await, json!({ "event": "left", "data": "a_b" }));
    assert_eq!(t.state.rooms.subscriber_count("a_b").await, 1);

    emit(&mut a, "send_message", json!({ "room": "a_b", "message": "still there?" })).await;
    assert_eq!(next_event(&mut a).await["data"]["message"], "still there?");
    assert!(stays_quiet(&mut b).await);
}

#[tokio::test]
async fn messages_arrive_in_send_order() {
    let (addr, _t) = serve().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    join(&mut a, "a_b").await;
    join(&mut b, "a_b").await;

    for i in 0..20 {
        emit(&mut a, "send_message", json!({ "room": "a_b", "message": i })).await;
    }
    for i in 0..20 {
        assert_eq!(next_event(&mut b).await["data"]["message"], i);
    }
}

#[tokio::test]
async fn malformed_frames_are_ignored_and_disconnects_clean_up() {
    let (addr, t) = serve().await;
    let mut a = connect(addr).await;

    a.send(Message::text("not json")).await.unwrap();
    emit(&mut a, "shout", json!("a_b")).await;
    join(&mut a, "a_b").await;
    join(&mut a, "a_c").await;
    assert_eq!(t.state.rooms.room_count().await, 2);

    a.close(None).await.unwrap();
    drop(a);

    let rooms = t.state.rooms.clone();
    timeout(Duration::from_secs(5), async move {
        while rooms.room_count().await != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("disconnect should empty every room");
}
