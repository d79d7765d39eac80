//! Error types for the evaluation loop.
//!
//! Transport failures are kept separate from fatal evaluation errors so the
//! evaluator can decide what to retry by matching on the type instead of
//! inspecting messages.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to complete an HTTP exchange with the answer service.
///
/// Every variant is retryable. An unexpected status code is not a transport
/// failure; it comes back as a normal [`ServiceResponse`](crate::model::ServiceResponse).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other network-level failure, including a body that could not be read.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors that stop an evaluation run.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The question bank could not be opened or read.
    #[error("failed to read question bank {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not valid JSON.
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A line decoded to something other than a JSON object.
    #[error("line {line}: record is not a JSON object")]
    NotAnObject { line: usize },

    /// A record has no `^` field.
    #[error("line {line}: missing expected answer field `^`")]
    MissingAnswer { line: usize },

    /// A record's `^` field is present but not a string.
    #[error("line {line}: expected answer field `^` must be a string")]
    NonStringAnswer { line: usize },

    /// A bounded retry policy ran out of attempts.
    #[error("line {line}: gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        line: usize,
        attempts: u32,
        last_error: TransportError,
    },

    /// Progress output could not be written.
    #[error("failed to write progress: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },
}
