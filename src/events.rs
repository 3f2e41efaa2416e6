//! Lifecycle events emitted by the dashboard client
//!
//! The client publishes one `Started` and one terminal event per network fetch
//! attempt on a broadcast channel. Presentation code (see [`crate::notify`])
//! subscribes to render notifications; the client never renders anything.

use tokio::sync::broadcast;
use tracing::debug;

use crate::data::Role;

/// Capacity of the broadcast channel; slow subscribers lag past this
const EVENT_CAPACITY: usize = 64;

/// User-visible operation a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A cache-aware or forced load
    Fetch,
    /// An explicit cache clear followed by a forced load
    Refresh,
}

/// Messages published by the dashboard client
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A fetch attempt began
    Started {
        role: Role,
        operation: Operation,
        /// The attempt joined a request that was already in flight
        joined: bool,
    },
    /// The fetch produced a valid response
    Succeeded { role: Role, operation: Operation },
    /// The fetch failed
    Failed {
        role: Role,
        operation: Operation,
        category: String,
        detail: String,
    },
    /// The caller cancelled the fetch; nothing was written to the cache
    Cancelled { role: Role, operation: Operation },
}

/// Fan-out of [`DashboardEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribes to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event; having no subscribers is not an error
    pub fn emit(&self, event: DashboardEvent) {
        debug!(event = "dashboard.event_emitted", details = ?event);
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
