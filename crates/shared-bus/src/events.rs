//! # Feed Events
//!
//! Every event the scan controller publishes. Observers narrow what they
//! receive by topic and by scan direction.

use serde::{Deserialize, Serialize};
use shared_types::entities::{PostId, ScanDirection};

/// Which historical source the backward driver reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    /// Walk blocks downward through the node RPC.
    Rpc,
    /// Page through the indexer API.
    Indexer,
}

impl HistorySource {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistorySource::Rpc => "rpc",
            HistorySource::Indexer => "indexer",
        }
    }
}

impl std::str::FromStr for HistorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpc" => Ok(HistorySource::Rpc),
            "indexer" => Ok(HistorySource::Indexer),
            other => Err(format!("unknown history source '{other}' (expected rpc or indexer)")),
        }
    }
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    // =========================================================================
    // POST GRAPH
    // =========================================================================
    /// A batch of candidates was merged into the graph.
    PostsMerged {
        /// Direction of the scan that produced the batch.
        direction: ScanDirection,
        /// Ids of newly inserted posts, in merge order.
        post_ids: Vec<PostId>,
        /// Ids of posts moved from an orphan tree into the reply tree.
        deorphaned: Vec<PostId>,
    },

    // =========================================================================
    // SCAN DRIVERS
    // =========================================================================
    /// A driver committed a new watermark.
    WatermarkAdvanced {
        /// Driver direction.
        direction: ScanDirection,
        /// Committed block height.
        height: u64,
    },

    /// The backward driver paused until the next explicit trigger.
    HistoryPaused {
        /// Why the driver paused.
        reason: String,
    },

    /// Backward scanning reached the first relevant block or the end of the
    /// indexer listing.
    HistoryFinished,

    // =========================================================================
    // TRANSPORT
    // =========================================================================
    /// The node RPC became reachable or unreachable.
    NodeAvailability {
        /// Current reachability.
        available: bool,
    },

    /// The indexer API was marked unusable.
    IndexerInvalid {
        /// Failure description.
        reason: String,
    },

    /// The backward driver switched between RPC and indexer.
    HistorySourceChanged(HistorySource),
}

impl FeedEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::PostsMerged { .. } => EventTopic::Posts,
            Self::WatermarkAdvanced { .. } | Self::HistoryPaused { .. } | Self::HistoryFinished => {
                EventTopic::Scan
            }
            Self::NodeAvailability { .. }
            | Self::IndexerInvalid { .. }
            | Self::HistorySourceChanged(_) => EventTopic::Transport,
        }
    }

    /// Scan direction the event belongs to, if any.
    ///
    /// Pause and exhaustion only ever concern the backward driver.
    #[must_use]
    pub fn direction(&self) -> Option<ScanDirection> {
        match self {
            Self::PostsMerged { direction, .. } | Self::WatermarkAdvanced { direction, .. } => {
                Some(*direction)
            }
            Self::HistoryPaused { .. } | Self::HistoryFinished => Some(ScanDirection::Backward),
            Self::NodeAvailability { .. }
            | Self::IndexerInvalid { .. }
            | Self::HistorySourceChanged(_) => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Post graph changes.
    Posts,
    /// Driver progress and lifecycle.
    Scan,
    /// Node and indexer reachability.
    Transport,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Scan direction to include. Events without a direction are dropped
    /// when set.
    pub direction: Option<ScanDirection>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            direction: None,
        }
    }

    /// Create a filter for the events of one scan driver.
    #[must_use]
    pub fn for_direction(direction: ScanDirection) -> Self {
        Self {
            topics: Vec::new(),
            direction: Some(direction),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &FeedEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let direction_match = self.direction.is_none() || event.direction() == self.direction;

        topic_match && direction_match
    }
}
