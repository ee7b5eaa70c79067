//! The router loop: a single background task that owns the job store and
//! configuration, serializing every command so no request overlaps another.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::info;

use crate::config::Configuration;
use crate::jobs::JobStore;

use super::dispatcher::dispatch;
use super::events::BroadcastEmitter;

/// Requests queued while the loop works through earlier ones.
const REQUEST_BUFFER: usize = 64;

/// Broadcast messages buffered per subscriber before it starts lagging.
const BROADCAST_BUFFER: usize = 256;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Router loop is no longer running")]
    Closed,
}

/// Queue depths, reported on request for observability.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStatus {
    pub pending: usize,
    pub in_flight: usize,
}

enum Message {
    Request {
        body: Value,
        reply_tx: oneshot::Sender<Value>,
    },
    Status {
        reply_tx: oneshot::Sender<StoreStatus>,
    },
}

/// Cloneable handle for talking to a running router loop. All state access
/// goes through the loop; the handle holds none of it.
#[derive(Clone)]
pub struct RouterHandle {
    message_tx: mpsc::Sender<Message>,
    emitter: BroadcastEmitter,
}

impl RouterHandle {
    /// Send one raw request and wait for its reply. Fails only when the
    /// loop has stopped; protocol errors come back as ordinary replies.
    pub async fn request(&self, body: Value) -> Result<Value, RouterError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.message_tx
            .send(Message::Request { body, reply_tx })
            .await
            .map_err(|_| RouterError::Closed)?;
        reply_rx.await.map_err(|_| RouterError::Closed)
    }

    /// Current queue depths.
    pub async fn status(&self) -> Result<StoreStatus, RouterError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.message_tx
            .send(Message::Status { reply_tx })
            .await
            .map_err(|_| RouterError::Closed)?;
        reply_rx.await.map_err(|_| RouterError::Closed)
    }

    /// Subscribe to the lifecycle broadcast feed. Only messages emitted
    /// after this call are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.emitter.subscribe()
    }
}

/// The router loop state. Exclusive owner of the job store and
/// configuration for the lifetime of the task.
pub struct Router {
    store: JobStore,
    config: Configuration,
    message_rx: mpsc::Receiver<Message>,
    emitter: BroadcastEmitter,
}

impl Router {
    /// Spawn the router loop as a background task.
    ///
    /// The loop runs until every handle has been dropped; whatever is still
    /// pending or in-flight at that point is discarded.
    pub fn spawn(config: Configuration) -> RouterHandle {
        let (message_tx, message_rx) = mpsc::channel(REQUEST_BUFFER);
        let emitter = BroadcastEmitter::new(BROADCAST_BUFFER);

        let router = Router {
            store: JobStore::new(),
            config,
            message_rx,
            emitter: emitter.clone(),
        };
        tokio::spawn(router.run());

        RouterHandle {
            message_tx,
            emitter,
        }
    }

    async fn run(mut self) {
        info!("Router main loop started");
        while let Some(message) = self.message_rx.recv().await {
            self.handle(message);
        }
        info!(
            "Router main loop stopped ({} pending, {} in-flight discarded)",
            self.store.pending_len(),
            self.store.in_flight_len()
        );
    }

    /// One iteration: decode, mutate the store, emit any broadcast, then
    /// release the reply. The broadcast therefore never arrives instead of
    /// the reply, and the next command sees every mutation this one made.
    fn handle(&mut self, message: Message) {
        match message {
            Message::Request { body, reply_tx } => {
                let outcome = dispatch(&body, &mut self.store, &self.config);
                if let Some(event) = outcome.event {
                    self.emitter.emit(&event);
                }
                // The caller may have given up waiting; nothing to do then.
                let _ = reply_tx.send(outcome.reply);
            }
            Message::Status { reply_tx } => {
                let _ = reply_tx.send(StoreStatus {
                    pending: self.store.pending_len(),
                    in_flight: self.store.in_flight_len(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_reply_round_trip() {
        let router = Router::spawn(Configuration::default());

        let reply = router.request(json!({"command": "hello"})).await.unwrap();
        assert_eq!(reply, json!({"answer": "unknown command"}));
    }

    #[tokio::test]
    async fn test_mutations_visible_to_next_command() {
        let router = Router::spawn(Configuration::default());

        let accepted = router
            .request(json!({"command": "add job", "worker": "w", "data": "d"}))
            .await
            .unwrap();
        let id = accepted["job id"].as_str().unwrap().to_string();

        let job = router.request(json!({"command": "get job"})).await.unwrap();
        assert_eq!(job["job id"], json!(id));
    }

    #[tokio::test]
    async fn test_broadcast_arrives_with_reply() {
        let router = Router::spawn(Configuration::default());
        let mut events = router.subscribe();

        router
            .request(json!({"command": "add job", "worker": "w", "data": "d"}))
            .await
            .unwrap();

        // Emitted before the reply resolved, so it is already buffered.
        assert_eq!(events.try_recv().unwrap(), "new job");
    }

    #[tokio::test]
    async fn test_status_reports_queue_depths() {
        let router = Router::spawn(Configuration::default());

        router
            .request(json!({"command": "add job", "worker": "w", "data": "d"}))
            .await
            .unwrap();
        router
            .request(json!({"command": "add job", "worker": "w", "data": "d"}))
            .await
            .unwrap();
        router.request(json!({"command": "get job"})).await.unwrap();

        let status = router.status().await.unwrap();
        assert_eq!(status.pending, 1);
        assert_eq!(status.in_flight, 1);
    }

    #[tokio::test]
    async fn test_independent_routers_do_not_share_state() {
        let first = Router::spawn(Configuration::default());
        let second = Router::spawn(Configuration::default());

        first
            .request(json!({"command": "add job", "worker": "w", "data": "d"}))
            .await
            .unwrap();

        let job = second.request(json!({"command": "get job"})).await.unwrap();
        assert_eq!(job, json!({"worker": null}));
    }

    #[tokio::test]
    async fn test_loop_survives_malformed_requests() {
        let router = Router::spawn(Configuration::default());

        for bad in [json!([]), json!({"command": 1}), json!({"spam": "eggs"})] {
            let reply = router.request(bad).await.unwrap();
            assert_eq!(reply, json!({"answer": "undefined command"}));
        }

        // Still serving after every bad request.
        let reply = router
            .request(json!({"command": "get configuration"}))
            .await
            .unwrap();
        assert_eq!(reply, json!({}));
    }
}
