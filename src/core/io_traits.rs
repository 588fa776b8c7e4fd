//! I/O traits for feed session operations
//!
//! These traits abstract the network side of a telemetry feed, enabling
//! session tests with mock implementations instead of a live socket.

use serde_json::Value;

// =============================================================================
// CONNECTION STATUS
// =============================================================================

/// Connection status for the telemetry server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected to server
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected, batches flowing
    Connected,
    /// Connection lost, waiting before the next attempt
    Reconnecting,
    /// Connection attempt failed
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Error => "error",
        }
    }
}

// =============================================================================
// FEED EVENTS
// =============================================================================

/// Events received from the feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Connection status changed
    StatusChanged(ConnectionStatus),
    /// A new connection was established; data from earlier connections is stale
    Opened,
    /// Partial update, to be merged into the snapshot
    Batch(Vec<(String, Value)>),
    /// Server-reported, decode or transport error
    Error(String),
}

// =============================================================================
// I/O TRAITS
// =============================================================================

/// Trait for receiving events from the feed
pub trait FeedEventReceiver {
    /// Poll for the next feed event (non-blocking)
    ///
    /// Returns `Some(event)` if an event is available, `None` otherwise.
    fn poll_event(&mut self) -> Option<FeedEvent>;
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// =============================================================================

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Mock feed for testing
    ///
    /// Events are queued by the test and drained by `poll_event()` in order.
    #[derive(Default)]
    pub struct MockFeed {
        pub pending_events: VecDeque<FeedEvent>,
    }

    impl MockFeed {
        pub fn new() -> Self {
            Self::default()
        }

        /// A feed that has just connected
        pub fn connected() -> Self {
            let mut feed = Self::new();
            feed.queue_connected();
            feed
        }

        pub fn queue_event(&mut self, event: FeedEvent) {
            self.pending_events.push_back(event);
        }

        pub fn queue_connected(&mut self) {
            self.queue_event(FeedEvent::StatusChanged(ConnectionStatus::Connected));
            self.queue_event(FeedEvent::Opened);
        }

        pub fn queue_lost(&mut self) {
            self.queue_event(FeedEvent::StatusChanged(ConnectionStatus::Reconnecting));
        }

        /// Queue a batch from `(key, value)` pairs
        pub fn queue_batch(&mut self, pairs: &[(&str, Value)]) {
            self.queue_event(FeedEvent::Batch(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
        }

        pub fn queue_error(&mut self, message: &str) {
            self.queue_event(FeedEvent::Error(message.to_string()));
        }

        pub fn pending(&self) -> usize {
            self.pending_events.len()
        }
    }

    impl FeedEventReceiver for MockFeed {
        fn poll_event(&mut self) -> Option<FeedEvent> {
            self.pending_events.pop_front()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
