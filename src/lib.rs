//! jobnet: a job-distribution router.
//!
//! One broker process accepts job submissions from producers, hands jobs out
//! to workers on demand, tracks completion, and publishes lifecycle events
//! to any number of passive observers. Producers and workers talk to the
//! command endpoint (one reply per request); observers follow the broadcast
//! feed independently.

pub mod cli;
pub mod config;
pub mod jobs;
pub mod router;
pub mod server;
