//! # Shared Bus - Feed Event Bus
//!
//! Carries notifications from the scan drivers and the post graph to any
//! observer (logging task, UI bridge, tests).
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Scan drivers │    publish()       │  Observers   │
//! │ Post graph   │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Publishing never blocks a driver: events with no listener are dropped.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, FeedEvent, HistorySource};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
