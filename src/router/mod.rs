//! The routing core: request decoding, command dispatch, lifecycle
//! broadcasts, and the single serialized loop that ties them together.

pub mod command;
pub mod dispatcher;
pub mod events;
pub mod service;

pub use command::{decode, Command, CommandError};
pub use dispatcher::{dispatch, Dispatch};
pub use events::{BroadcastEmitter, Event};
pub use service::{Router, RouterError, RouterHandle, StoreStatus};
