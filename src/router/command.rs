//! Request decoding: a raw JSON mapping in, a validated [`Command`] out.

use serde_json::{Number, Value};
use thiserror::Error;

/// Protocol-level failures. Every one of these reaches the caller as a
/// `{"answer": ...}` reply, never as a transport fault; the Display strings
/// are the exact answer values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The request has no usable `command` field.
    #[error("undefined command")]
    Undefined,

    /// The `command` value is not one of the recognized commands.
    #[error("unknown command")]
    Unknown,

    /// A recognized command is missing a required field.
    #[error("syntax error")]
    Syntax,

    /// `job finished` named an id that is not currently in-flight.
    #[error("unknown job id")]
    UnknownJobId,
}

/// A decoded, validated request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetConfiguration,
    AddJob { worker: String, data: Value },
    GetJob,
    JobFinished { job_id: String, duration: Number },
}

/// Decode a raw request into a command.
///
/// Command matching is case-sensitive and exact-string; fields beyond the
/// required set are ignored. A non-object request or a non-string `command`
/// value counts as having no `command` field at all.
pub fn decode(request: &Value) -> Result<Command, CommandError> {
    let fields = request.as_object().ok_or(CommandError::Undefined)?;
    let command = fields
        .get("command")
        .and_then(Value::as_str)
        .ok_or(CommandError::Undefined)?;

    match command {
        "get configuration" => Ok(Command::GetConfiguration),
        "get job" => Ok(Command::GetJob),
        "add job" => {
            let worker = fields
                .get("worker")
                .and_then(Value::as_str)
                .ok_or(CommandError::Syntax)?;
            let data = fields.get("data").ok_or(CommandError::Syntax)?;
            Ok(Command::AddJob {
                worker: worker.to_string(),
                data: data.clone(),
            })
        }
        "job finished" => {
            let job_id = fields
                .get("job id")
                .and_then(Value::as_str)
                .ok_or(CommandError::Syntax)?;
            let duration = fields
                .get("duration")
                .and_then(Value::as_number)
                .ok_or(CommandError::Syntax)?;
            Ok(Command::JobFinished {
                job_id: job_id.to_string(),
                duration: duration.clone(),
            })
        }
        _ => Err(CommandError::Unknown),
    }
}
