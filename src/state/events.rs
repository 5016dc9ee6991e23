//! Subject-keyed pub/sub fabric built on bounded broadcast channels.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Subject carrying lobby-wide room list changes.
pub const LOBBY_SUBJECT: &str = "app.lobby.rooms";

/// Subject carrying changes for a single room.
pub fn room_subject(room: &str) -> String {
    format!("app.room.{room}")
}

/// Event vocabulary understood by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomEvent {
    /// Membership, readiness or selections changed.
    RoomUpdate,
    /// A chat message was appended.
    MessageSent,
    /// The host started the draft.
    RoomStart,
    /// Voting opened, or reopened among tied movies.
    RoomVoting,
    /// A reveal line became visible.
    RoomAnnounce,
    /// Results are available.
    RoomFinish,
    /// The lobby room list changed.
    RoomListUpdate,
}

impl RoomEvent {
    /// Wire token; part of the external contract.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomEvent::RoomUpdate => "RoomUpdate",
            RoomEvent::MessageSent => "MessageSent",
            RoomEvent::RoomStart => "RoomStart",
            RoomEvent::RoomVoting => "RoomVoting",
            RoomEvent::RoomAnnounce => "RoomAnnounce",
            RoomEvent::RoomFinish => "RoomFinish",
            RoomEvent::RoomListUpdate => "RoomListUpdate",
        }
    }
}

/// An event as delivered to subscribers, tagged with its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Subject the event was published on.
    pub subject: Arc<str>,
    /// What happened.
    pub event: RoomEvent,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time fabric counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusStats {
    /// Publish calls since startup, including those with no subscribers.
    pub published: u64,
    /// Events lost by subscribers that fell behind their buffer.
    pub dropped: u64,
    /// Subjects with an open channel.
    pub subjects: usize,
}

/// Publishes never block: a subscriber that falls more than `capacity` events behind
/// loses the oldest ones, while order is preserved for everything it does receive.
pub struct EventBus {
    capacity: usize,
    subjects: DashMap<String, broadcast::Sender<Published>>,
    counters: Arc<Counters>,
}

impl EventBus {
    /// Fabric whose per-subscriber buffer holds `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subjects: DashMap::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Deliver `event` to every current subscriber of `subject`.
    pub fn publish(&self, subject: &str, event: RoomEvent) {
        self.counters.published.fetch_add(1, Ordering::Relaxed);

        let Some(sender) = self.subjects.get(subject).map(|entry| entry.value().clone()) else {
            debug!(subject, event = event.as_str(), "no subscribers for subject");
            return;
        };

        let published = Published {
            subject: Arc::from(subject),
            event,
        };
        match sender.send(published) {
            Ok(receivers) => debug!(subject, event = event.as_str(), receivers, "published event"),
            Err(_) => debug!(subject, event = event.as_str(), "subscribers already gone"),
        }
    }

    /// Register a new subscriber that receives every later event on `subject`.
    pub fn subscribe(&self, subject: &str) -> EventSubscription {
        let receiver = self
            .subjects
            .entry(subject.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        EventSubscription {
            subject: subject.to_owned(),
            receiver,
            counters: self.counters.clone(),
        }
    }

    /// Drop the channel for `subject`; its subscribers end after draining what is buffered.
    pub fn close(&self, subject: &str) {
        if self.subjects.remove(subject).is_some() {
            debug!(subject, "closed event subject");
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> BusStats {
        BusStats {
            published: self.counters.published.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            subjects: self.subjects.len(),
        }
    }
}

/// Receiving half of a subject. Dropping it cancels the subscription.
pub struct EventSubscription {
    subject: String,
    receiver: broadcast::Receiver<Published>,
    counters: Arc<Counters>,
}

impl EventSubscription {
    /// Subject this subscription listens on.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Next event in publish order, or `None` once the subject has been closed.
    pub async fn next(&mut self) -> Option<Published> {
        loop {
            match self.receiver.recv().await {
                Ok(published) => return Some(published),
                Err(RecvError::Lagged(skipped)) => {
                    self.counters.dropped.fetch_add(skipped, Ordering::Relaxed);
                    warn!(subject = %self.subject, skipped, "subscriber lagged; dropping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Adapt the subscription into a stream ending when the subject closes.
    pub fn into_stream(self) -> impl Stream<Item = Published> + Send + 'static {
        let mut subscription = self;
        async_stream::stream! {
            while let Some(published) = subscription.next().await {
                yield published;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::time::timeout;

    use super::*;

    #[test]
    fn tokens_match_wire_vocabulary() {
        assert_eq!(RoomEvent::RoomListUpdate.as_str(), "RoomListUpdate");
        assert_eq!(RoomEvent::MessageSent.as_str(), "MessageSent");
        assert_eq!(room_subject("r1"), "app.room.r1");
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let bus = EventBus::new(16);
        let mut first = bus.subscribe("app.room.r1");
        let mut second = bus.subscribe("app.room.r1");

        bus.publish("app.room.r1", RoomEvent::RoomStart);
        bus.publish("app.room.r1", RoomEvent::RoomUpdate);
        bus.publish("app.room.other", RoomEvent::RoomFinish);

        for sub in [&mut first, &mut second] {
            assert_eq!(sub.next().await.map(|p| p.event), Some(RoomEvent::RoomStart));
            assert_eq!(sub.next().await.map(|p| p.event), Some(RoomEvent::RoomUpdate));
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::new(4);
        bus.publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);

        let stats = bus.stats();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.subjects, 0);
    }

    #[tokio::test]
    async fn slow_subscriber_drops_oldest_and_keeps_order() {
        let bus = EventBus::new(2);
        let mut slow = bus.subscribe(LOBBY_SUBJECT);

        bus.publish(LOBBY_SUBJECT, RoomEvent::RoomStart);
        bus.publish(LOBBY_SUBJECT, RoomEvent::RoomVoting);
        bus.publish(LOBBY_SUBJECT, RoomEvent::RoomAnnounce);
        bus.publish(LOBBY_SUBJECT, RoomEvent::RoomFinish);

        assert_eq!(slow.next().await.map(|p| p.event), Some(RoomEvent::RoomAnnounce));
        assert_eq!(slow.next().await.map(|p| p.event), Some(RoomEvent::RoomFinish));
        assert_eq!(bus.stats().dropped, 2);
    }

    #[tokio::test]
    async fn closing_a_subject_ends_its_streams() {
        let bus = EventBus::new(4);
        let stream = bus.subscribe("app.room.gone").into_stream();
        bus.publish("app.room.gone", RoomEvent::RoomUpdate);
        bus.close("app.room.gone");

        let events = timeout(Duration::from_secs(1), stream.collect::<Vec<_>>())
            .await
            .unwrap();
        assert_eq!(
            events.into_iter().map(|p| p.event).collect::<Vec<_>>(),
            [RoomEvent::RoomUpdate]
        );
    }

    #[tokio::test]
    async fn dropped_subscription_does_not_block_publishers() {
        let bus = EventBus::new(1);
        let subscription = bus.subscribe(LOBBY_SUBJECT);
        drop(subscription);

        for _ in 0..10 {
            bus.publish(LOBBY_SUBJECT, RoomEvent::RoomListUpdate);
        }
        assert_eq!(bus.stats().published, 10);
    }
}
