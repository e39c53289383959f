use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat message as clients exchange it: `{room, message, sender, receiver, time}`.
///
/// Only `room` is interpreted. Everything else is carried through untouched,
/// so subscribers receive exactly what the sender sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub room: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ChatPayload {
    pub fn new(
        room: String,
        message: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        let mut body = Map::new();
        body.insert("message".to_owned(), Value::String(message.into()));
        body.insert("sender".to_owned(), Value::String(sender.into()));
        body.insert("receiver".to_owned(), Value::String(receiver.into()));
        body.insert("time".to_owned(), Value::String(time.into()));
        Self { room, body }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub(crate) enum ClientEvent {
    Join(String),
    Leave(String),
    SendMessage(ChatPayload),
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent<'a> {
    ReceiveMessage(&'a ChatPayload),
    Joined(&'a str),
    Left(&'a str),
}

impl ServerEvent<'_> {
    /// Serialized once, then shared by every subscriber it is sent to.
    pub fn to_frame(&self) -> serde_json::Result<Arc<str>> {
        Ok(serde_json::to_string(self)?.into())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn send_message_keeps_unknown_fields() {
        let raw = json!({
            "event": "send_message",
            "data": {
                "room": "admin_F1",
                "message": "hi",
                "sender": { "_id": "F1", "name": "Freddie" },
                "receiver": "admin",
                "time": "10:42:00",
                "client_seq": 3,
            }
        });

        let ClientEvent::SendMessage(payload) = serde_json::from_value(raw.clone()).unwrap() else {
            panic!("not a send_message");
        };
        assert_eq!(payload.room, "admin_F1");

        let frame = ServerEvent::ReceiveMessage(&payload).to_frame().unwrap();
        let echoed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(echoed["event"], "receive_message");
        assert_eq!(echoed["data"], raw["data"]);
    }

    #[test]
    fn join_and_leave_carry_the_room() {
        let ev: ClientEvent = serde_json::from_str(r#"{"event":"join","data":"a_b"}"#).unwrap();
        assert!(matches!(ev, ClientEvent::Join(room) if room == "a_b"));

        let ev: ClientEvent = serde_json::from_str(r#"{"event":"leave","data":"a_b"}"#).unwrap();
        assert!(matches!(ev, ClientEvent::Leave(room) if room == "a_b"));
    }

    #[test]
    fn rejects_unknown_events() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"shout","data":"x"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"send_message","data":{"message":"no room"}}"#).is_err());
    }
}
