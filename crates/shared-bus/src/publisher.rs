//! # Event Publisher
//!
//! The scan controller publishes through `EventPublisher`; observers attach
//! to the `InMemoryEventBus` directly.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::events::{EventFilter, FeedEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`, returning how many receivers were listening.
    async fn publish(&self, event: FeedEvent) -> usize;

    /// Events published since the bus was created.
    fn events_published(&self) -> u64;
}

/// Broadcast bus shared by the controller and its observers.
///
/// A slow observer lags and loses the oldest events; publishers never wait.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<FeedEvent>,
    published: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus buffering `DEFAULT_CHANNEL_CAPACITY` events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Pull-style subscription for events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, direction = ?filter.direction, "Feed subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// `Stream` of events matching `filter`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Receivers currently attached.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: FeedEvent) -> usize {
        let topic = event.topic();
        let direction = event.direction();
        self.published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(?topic, ?direction, receivers, "Feed event published");
                receivers
            }
            Err(_) => {
                trace!(?topic, ?direction, "Feed event dropped, nobody listening");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
