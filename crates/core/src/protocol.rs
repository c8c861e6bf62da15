//! Wire envelope for the job-status socket.
//!
//! Every frame is a JSON object with exactly one key: the command name,
//! whose value is the command's argument. The client sends
//! `{"subscribe": "<job-id>"}` and receives `{"subscribed": "<job-id>"}`
//! followed by `{"job": "running"}` and `{"job": "done"}`.
//!
//! Inbound frames are decoded once, here, into [`ServerMessage`]. Anything
//! that does not fit the envelope becomes [`ServerMessage::Unrecognized`]
//! instead of an error, so a bad frame can never take down the caller.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Outbound command requesting status pushes for a job.
pub const CMD_SUBSCRIBE: &str = "subscribe";

/// Inbound acknowledgement of a subscription.
pub const CMD_SUBSCRIBED: &str = "subscribed";

/// Inbound job lifecycle command.
pub const CMD_JOB: &str = "job";

/// Argument of [`CMD_JOB`] sent when the job starts executing.
pub const JOB_RUNNING: &str = "running";

/// Argument of [`CMD_JOB`] sent when the job has finished.
pub const JOB_DONE: &str = "done";

/// Outbound `{"subscribe": "<job-id>"}` frame.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    pub subscribe: &'a str,
}

/// Serialize the subscribe frame for `job_id`.
pub fn encode_subscribe(job_id: &str) -> Result<String, CoreError> {
    Ok(serde_json::to_string(&SubscribeRequest { subscribe: job_id })?)
}

/// Argument of an inbound `job` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobCommand {
    Running,
    Done,
    /// Any other argument, kept verbatim for diagnostics.
    Other(String),
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The server acknowledged a subscription for the given job.
    Subscribed(String),

    /// A job lifecycle transition.
    Job(JobCommand),

    /// Malformed JSON, not exactly one key, or an unknown command.
    ///
    /// `command` holds the first key when the frame was at least a JSON
    /// object.
    Unrecognized { command: Option<String> },
}

/// Raw shape of a well-formed frame: an externally tagged single-key object.
#[derive(Debug, Deserialize)]
enum WireMessage {
    #[serde(rename = "job")]
    Job(serde_json::Value),

    #[serde(rename = "subscribed")]
    Subscribed(serde_json::Value),
}

/// Decode a text frame into a [`ServerMessage`].
///
/// Never fails: frames that do not match the envelope map to
/// [`ServerMessage::Unrecognized`].
pub fn parse_message(text: &str) -> ServerMessage {
    match serde_json::from_str::<WireMessage>(text) {
        Ok(WireMessage::Job(arg)) => ServerMessage::Job(job_command(arg)),
        Ok(WireMessage::Subscribed(arg)) => ServerMessage::Subscribed(argument_text(arg)),
        Err(_) => ServerMessage::Unrecognized {
            command: first_key(text),
        },
    }
}

fn job_command(arg: serde_json::Value) -> JobCommand {
    match arg.as_str() {
        Some(JOB_RUNNING) => JobCommand::Running,
        Some(JOB_DONE) => JobCommand::Done,
        _ => JobCommand::Other(argument_text(arg)),
    }
}

/// String arguments are taken as-is; anything else as its JSON text.
fn argument_text(arg: serde_json::Value) -> String {
    match arg {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn first_key(text: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text)
        .ok()?
        .into_iter()
        .next()
        .map(|(key, _)| key)
}
