//! Lifecycle broadcasts: plain, human-readable messages published whenever
//! the job store is mutated in a way observers care about.

use std::fmt;

use serde_json::Number;
use tokio::sync::broadcast;

/// A notification to publish on the broadcast feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A job was accepted. Carries no id; subscribers query `get job` to
    /// learn details.
    NewJob,

    /// A dispatched job was reported finished. `duration` echoes the
    /// caller's numeric representation.
    JobFinished { job_id: String, duration: Number },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::NewJob => write!(f, "new job"),
            Event::JobFinished { job_id, duration } => {
                write!(f, "job finished: {} duration: {}", job_id, duration)
            }
        }
    }
}

/// Fan-out sender for lifecycle events, independent of the request/reply
/// exchange that triggered them. Delivery is fire-and-forget.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<String>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one event to whoever is currently subscribed.
    pub fn emit(&self, event: &Event) {
        // Ignore send errors (no subscribers is fine).
        let _ = self.tx.send(event.to_string());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
