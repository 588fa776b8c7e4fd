//! Feed session - drives a pipeline from feed events
//!
//! FeedSession is the owner-thread side of a subscription: it drains the
//! event receiver, merges batches into the pipeline and keeps the latest
//! view, the latest error and the connection status.

use tracing::{debug, warn};

use crate::core::io_traits::{ConnectionStatus, FeedEvent, FeedEventReceiver};
use crate::core::pipeline::Pipeline;
use crate::core::schema::SchemaError;
use crate::core::validate::TelemetryView;

// =============================================================================
// SESSION EVENTS
// =============================================================================

/// Events emitted by FeedSession for rendering and logging
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Connection status changed
    ConnectionChanged(ConnectionStatus),
    /// A batch produced a valid view
    ViewUpdated,
    /// The view went from ready to not ready
    ViewWithheld,
    /// Server, decode or transport error
    FeedError(String),
}

// =============================================================================
// FEED SESSION
// =============================================================================

pub struct FeedSession<V> {
    pipeline: Pipeline<V>,
    view: Option<V>,
    last_error: Option<String>,
    status: ConnectionStatus,
}

impl<V: TelemetryView> FeedSession<V> {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self::with_pipeline(Pipeline::new()?))
    }

    pub fn with_pipeline(pipeline: Pipeline<V>) -> Self {
        Self {
            pipeline,
            view: None,
            last_error: None,
            status: ConnectionStatus::Disconnected,
        }
    }

    /// Latest valid view, if the snapshot is ready
    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn pipeline(&self) -> &Pipeline<V> {
        &self.pipeline
    }

    /// Subscription keys
    pub fn keys(&self) -> &[String] {
        self.pipeline.schema().keys()
    }

    /// Drain all pending feed events
    ///
    /// Returns the events that occurred, in order.
    pub fn update<R: FeedEventReceiver>(&mut self, feed: &mut R) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = feed.poll_event() {
            self.handle_event(event, &mut events);
        }
        events
    }

    fn handle_event(&mut self, event: FeedEvent, events: &mut Vec<SessionEvent>) {
        match event {
            FeedEvent::StatusChanged(status) => {
                if status == self.status {
                    return;
                }
                debug!(status = status.label(), "[SESSION] Connection status");
                let was_connected = self.status == ConnectionStatus::Connected;
                self.status = status;
                events.push(SessionEvent::ConnectionChanged(status));

                if was_connected && status != ConnectionStatus::Connected {
                    self.withhold(events);
                }
            }
            FeedEvent::Opened => {
                debug!("[SESSION] New connection, resetting snapshot");
                self.pipeline.reset();
                self.last_error = None;
                self.withhold(events);
            }
            FeedEvent::Batch(batch) => match self.pipeline.ingest(batch) {
                Some(view) => {
                    self.view = Some(view);
                    events.push(SessionEvent::ViewUpdated);
                }
                None => self.withhold(events),
            },
            FeedEvent::Error(message) => {
                warn!(error = %message, "[SESSION] Feed error");
                self.last_error = Some(message.clone());
                events.push(SessionEvent::FeedError(message));
            }
        }
    }

    fn withhold(&mut self, events: &mut Vec<SessionEvent>) {
        if self.view.take().is_some() {
            events.push(SessionEvent::ViewWithheld);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
