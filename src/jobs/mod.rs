//! Job storage: the FIFO queue of pending jobs and the table of in-flight
//! (dispatched, unfinished) jobs. Pure data structure, no I/O.

use std::collections::{HashMap, VecDeque};

use serde_json::{Number, Value};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum JobError {
    #[error("unknown job id: {0}")]
    UnknownJobId(String),
}

/// A unit of work flowing through the router.
///
/// `id` is assigned at creation and never reused within a process lifetime;
/// `duration` is set only when completion is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub worker: String,
    pub data: Value,
    pub duration: Option<Number>,
}

/// Owns every job the router knows about. A job is in exactly one of:
/// the pending queue, the in-flight table, or gone.
#[derive(Debug, Default)]
pub struct JobStore {
    pending: VecDeque<Job>,
    in_flight: HashMap<String, Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new pending job and hand back its identifier: 32 hex
    /// characters from a fresh 128-bit random value.
    pub fn enqueue(&mut self, worker: String, data: Value) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.pending.push_back(Job {
            id: id.clone(),
            worker,
            data,
            duration: None,
        });
        id
    }

    /// Hand out the longest-pending job, moving it into the in-flight table.
    /// An empty queue is a normal result, not an error.
    pub fn dequeue(&mut self) -> Option<Job> {
        let job = self.pending.pop_front()?;
        self.in_flight.insert(job.id.clone(), job.clone());
        Some(job)
    }

    /// Record completion of an in-flight job, removing it permanently.
    /// Ids that were never dispatched, already completed, or fabricated
    /// signal `UnknownJobId`.
    pub fn complete(&mut self, id: &str, duration: Number) -> Result<Job, JobError> {
        let mut job = self
            .in_flight
            .remove(id)
            .ok_or_else(|| JobError::UnknownJobId(id.to_string()))?;
        job.duration = Some(duration);
        Ok(job)
    }

    /// Number of jobs waiting to be dispatched.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of dispatched jobs awaiting a completion report.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(n: f64) -> Number {
        Number::from_f64(n).unwrap()
    }

    #[test]
    fn test_enqueue_returns_32_char_hex_ids() {
        let mut store = JobStore::new();
        let id = store.enqueue("spam".to_string(), json!("eggs"));

        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_enqueue_ids_are_distinct() {
        let mut store = JobStore::new();
        let mut ids: Vec<String> = (0..100)
            .map(|_| store.enqueue("w".to_string(), json!(null)))
            .collect();

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_dequeue_is_fifo() {
        let mut store = JobStore::new();
        let first = store.enqueue("a".to_string(), json!(1));
        let second = store.enqueue("b".to_string(), json!(2));

        assert_eq!(store.dequeue().unwrap().id, first);
        assert_eq!(store.dequeue().unwrap().id, second);
        assert!(store.dequeue().is_none());
    }

    #[test]
    fn test_dequeue_moves_job_in_flight() {
        let mut store = JobStore::new();
        store.enqueue("a".to_string(), json!(1));

        assert_eq!(store.pending_len(), 1);
        assert_eq!(store.in_flight_len(), 0);

        let job = store.dequeue().unwrap();
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.in_flight_len(), 1);
        assert_eq!(job.worker, "a");
        assert_eq!(job.duration, None);
    }

    #[test]
    fn test_complete_records_duration_and_removes_job() {
        let mut store = JobStore::new();
        store.enqueue("a".to_string(), json!("payload"));
        let job = store.dequeue().unwrap();

        let finished = store.complete(&job.id, number(0.1)).unwrap();
        assert_eq!(finished.id, job.id);
        assert_eq!(finished.duration, Some(number(0.1)));
        assert_eq!(store.in_flight_len(), 0);
    }

    #[test]
    fn test_complete_twice_fails_second_time() {
        let mut store = JobStore::new();
        store.enqueue("a".to_string(), json!(null));
        let job = store.dequeue().unwrap();

        assert!(store.complete(&job.id, number(0.1)).is_ok());
        assert_eq!(
            store.complete(&job.id, number(0.2)),
            Err(JobError::UnknownJobId(job.id.clone()))
        );
    }

    #[test]
    fn test_complete_unknown_id_fails() {
        let mut store = JobStore::new();
        let result = store.complete("never issued", number(0.1));
        assert!(matches!(result, Err(JobError::UnknownJobId(_))));
    }

    #[test]
    fn test_complete_pending_but_not_dispatched_fails() {
        let mut store = JobStore::new();
        let id = store.enqueue("a".to_string(), json!(null));

        // Only dispatched jobs can be completed.
        assert!(store.complete(&id, number(0.1)).is_err());
        assert_eq!(store.pending_len(), 1);
    }
}
