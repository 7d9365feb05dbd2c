//! Progress events
//!
//! An in-process broadcast bus carrying the lifecycle of publish operations.
//! Emission never blocks: with no subscribers the event is dropped, and a
//! lagging subscriber loses the oldest events instead of slowing publishers.
//!
//! # Example
//!
//! ```no_run
//! use libpastecast::service::events::{Event, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::PublishStarted {
//!     operation_id: "op-1".to_string(),
//!     platforms: vec!["paste-rs".to_string()],
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PublishOutcome;

/// Default per-subscriber buffer
pub const DEFAULT_CAPACITY: usize = 100;

pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast bus for publish progress
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Lifecycle of one publish operation
///
/// Every operation emits exactly one `PublishStarted`, one
/// `PlatformFinished` per selected platform in completion order, and one
/// `PublishCompleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PublishStarted {
        operation_id: String,
        /// Selected platform names, in result order
        platforms: Vec<String>,
    },

    PlatformFinished {
        operation_id: String,
        outcome: PublishOutcome,
    },

    PublishCompleted {
        operation_id: String,
        successful: usize,
        total: usize,
    },
}

impl Event {
    pub fn operation_id(&self) -> &str {
        match self {
            Event::PublishStarted { operation_id, .. }
            | Event::PlatformFinished { operation_id, .. }
            | Event::PublishCompleted { operation_id, .. } => operation_id,
        }
    }
}
