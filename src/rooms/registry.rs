use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Mutex,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Where a connection's outgoing frames go. The connection drains it into its socket.
pub type Outbox = mpsc::Sender<Arc<str>>;

/// Frames a connection may have queued before it counts as stalled.
pub const OUTBOX_CAPACITY: usize = 64;

/// Live room memberships of this process.
///
/// All mutation and every publish go through one lock, which makes publish the
/// single dispatch point: frames published to a room reach each subscriber in
/// publish order.
#[derive(Clone, Default)]
pub struct Rooms {
    inner: Arc<Mutex<HashMap<String, HashMap<ConnectionId, Outbox>>>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the connection was already in the room.
    pub async fn subscribe(&self, connection: ConnectionId, room: &str, outbox: Outbox) -> bool {
        let mut rooms = self.inner.lock().await;
        let fresh = rooms
            .entry(room.to_owned())
            .or_default()
            .insert(connection, outbox)
            .is_none();
        debug!(%connection, room, "subscribed");
        fresh
    }

    /// Returns false if the connection was not in the room.
    pub async fn unsubscribe(&self, connection: ConnectionId, room: &str) -> bool {
        let mut rooms = self.inner.lock().await;
        let Entry::Occupied(mut members) = rooms.entry(room.to_owned()) else {
            return false;
        };

        let removed = members.get_mut().remove(&connection).is_some();
        if members.get().is_empty() {
            members.remove();
        }
        if removed {
            debug!(%connection, room, "unsubscribed");
        }
        removed
    }

    /// Drops the connection from every room. Returns how many it was in.
    pub async fn disconnect(&self, connection: ConnectionId) -> usize {
        let mut rooms = self.inner.lock().await;
        let mut left = 0;
        rooms.retain(|_, members| {
            if members.remove(&connection).is_some() {
                left += 1;
            }
            !members.is_empty()
        });
        left
    }

    /// Hands `frame` to every current subscriber of `room`, the sender included.
    ///
    /// Returns the number of deliveries. Subscribers whose outbox is closed or
    /// full are dropped from the room on the way.
    pub async fn publish(&self, room: &str, frame: Arc<str>) -> usize {
        let mut rooms = self.inner.lock().await;
        let Some(members) = rooms.get_mut(room) else {
            return 0;
        };

        let mut delivered = 0;
        members.retain(|connection, outbox| match outbox.try_send(frame.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(%connection, room, "outbox full, dropping subscriber");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        });
        if members.is_empty() {
            rooms.remove(room);
        }
        delivered
    }

    pub async fn subscriber_count(&self, room: &str) -> usize {
        self.inner.lock().await.get(room).map_or(0, HashMap::len)
    }

    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> (ConnectionId, Outbox, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        (Uuid::now_v7(), tx, rx)
    }

    #[tokio::test]
    async fn publish_reaches_only_that_room() {
        let rooms = Rooms::new();
        let (a, a_tx, mut a_rx) = conn();
        let (b, b_tx, mut b_rx) = conn();
        let (c, c_tx, mut c_rx) = conn();

        rooms.subscribe(a, "admin_F1", a_tx).await;
        rooms.subscribe(b, "admin_F1", b_tx).await;
        rooms.subscribe(c, "admin_F2", c_tx).await;

        assert_eq!(rooms.publish("admin_F1", "hello".into()).await, 2);

        assert_eq!(&*a_rx.recv().await.unwrap(), "hello");
        assert_eq!(&*b_rx.recv().await.unwrap(), "hello");
        assert!(c_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_to_empty_room_is_a_no_op() {
        let rooms = Rooms::new();
        assert_eq!(rooms.publish("nobody_here", "x".into()).await, 0);
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn order_is_kept_per_room() {
        let rooms = Rooms::new();
        let (a, a_tx, mut a_rx) = conn();
        rooms.subscribe(a, "r", a_tx).await;

        for i in 0..50 {
            rooms.publish("r", i.to_string().into()).await;
        }
        for i in 0..50 {
            assert_eq!(&*a_rx.recv().await.unwrap(), i.to_string());
        }
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let rooms = Rooms::new();
        let (a, a_tx, mut a_rx) = conn();

        assert!(rooms.subscribe(a, "r", a_tx.clone()).await);
        assert!(!rooms.subscribe(a, "r", a_tx).await);
        assert!(rooms.unsubscribe(a, "r").await);
        assert!(!rooms.unsubscribe(a, "r").await);
        assert!(!rooms.unsubscribe(a, "never_joined").await);

        assert_eq!(rooms.publish("r", "late".into()).await, 0);
        assert!(a_rx.try_recv().is_err());
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn disconnect_leaves_every_room() {
        let rooms = Rooms::new();
        let (a, a_tx, _a_rx) = conn();
        let (b, b_tx, _b_rx) = conn();

        rooms.subscribe(a, "r1", a_tx.clone()).await;
        rooms.subscribe(a, "r2", a_tx).await;
        rooms.subscribe(b, "r2", b_tx).await;

        assert_eq!(rooms.disconnect(a).await, 2);
        assert_eq!(rooms.subscriber_count("r1").await, 0);
        assert_eq!(rooms.subscriber_count("r2").await, 1);
        assert_eq!(rooms.room_count().await, 1);
    }

    #[tokio::test]
    async fn closed_outboxes_are_pruned() {
        let rooms = Rooms::new();
        let (a, a_tx, a_rx) = conn();
        let (b, b_tx, mut b_rx) = conn();
        rooms.subscribe(a, "r", a_tx).await;
        rooms.subscribe(b, "r", b_tx).await;

        drop(a_rx);
        assert_eq!(rooms.publish("r", "x".into()).await, 1);
        assert_eq!(rooms.subscriber_count("r").await, 1);
        assert_eq!(&*b_rx.recv().await.unwrap(), "x");
    }

    #[tokio::test]
    async fn stalled_subscribers_are_dropped() {
        let rooms = Rooms::new();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (b, b_tx, mut b_rx) = conn();
        let a = Uuid::now_v7();
        rooms.subscribe(a, "r", slow_tx).await;
        rooms.subscribe(b, "r", b_tx).await;

        assert_eq!(rooms.publish("r", "1".into()).await, 2);
        assert_eq!(rooms.publish("r", "2".into()).await, 1);
        assert_eq!(rooms.subscriber_count("r").await, 1);

        assert_eq!(&*b_rx.recv().await.unwrap(), "1");
        assert_eq!(&*b_rx.recv().await.unwrap(), "2");
    }
}
