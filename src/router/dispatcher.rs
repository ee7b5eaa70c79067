//! Command dispatch: applies one decoded request to the job store and
//! produces the reply plus at most one broadcast. No network knowledge.

use serde_json::{json, Value};
use tracing::debug;

use crate::config::Configuration;
use crate::jobs::JobStore;

use super::command::{decode, Command, CommandError};
use super::events::Event;

/// Outcome of one command.
#[derive(Debug, PartialEq)]
pub struct Dispatch {
    /// The structured reply to send back on the same request.
    pub reply: Value,
    /// The lifecycle broadcast to emit, if this command produced one.
    pub event: Option<Event>,
}

impl Dispatch {
    fn reply(reply: Value) -> Self {
        Self { reply, event: None }
    }

    fn with_event(reply: Value, event: Event) -> Self {
        Self {
            reply,
            event: Some(event),
        }
    }
}

fn answer(text: &str) -> Value {
    json!({ "answer": text })
}

/// Apply one raw request, producing the reply and any broadcast to emit.
///
/// Never fails: malformed requests degrade to error replies so a single bad
/// request can never take the loop down.
pub fn dispatch(request: &Value, store: &mut JobStore, config: &Configuration) -> Dispatch {
    let command = match decode(request) {
        Ok(command) => command,
        Err(e) => {
            debug!("Rejected request: {}", e);
            return Dispatch::reply(answer(&e.to_string()));
        }
    };

    match command {
        Command::GetConfiguration => Dispatch::reply(config.as_value()),

        Command::AddJob { worker, data } => {
            let id = store.enqueue(worker, data);
            debug!("Accepted job {} ({} pending)", id, store.pending_len());
            Dispatch::with_event(
                json!({ "answer": "job accepted", "job id": id }),
                Event::NewJob,
            )
        }

        Command::GetJob => match store.dequeue() {
            Some(job) => {
                debug!("Dispatched job {} to a worker", job.id);
                Dispatch::reply(json!({
                    "worker": job.worker,
                    "data": job.data,
                    "job id": job.id,
                }))
            }
            None => Dispatch::reply(json!({ "worker": null })),
        },

        Command::JobFinished { job_id, duration } => {
            match store.complete(&job_id, duration.clone()) {
                Ok(job) => {
                    debug!("Job {} finished in {}", job.id, duration);
                    Dispatch::with_event(
                        answer("good job!"),
                        Event::JobFinished {
                            job_id: job.id,
                            duration,
                        },
                    )
                }
                Err(e) => {
                    debug!("Rejected completion report: {}", e);
                    Dispatch::reply(answer(&CommandError::UnknownJobId.to_string()))
                }
            }
        }
    }
}
