//! Trait seams between the evaluator, the answer service, and progress output.

use std::io;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::model::{EvaluationState, Outcome, QuestionRecord, ServiceResponse};

/// A service that answers question-bank records over some transport.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Human-readable service name (e.g. "http").
    fn name(&self) -> &str;

    /// Submit one record's raw text and return whatever the service answered.
    ///
    /// Only failures to complete the exchange are errors. A non-200 status is
    /// a successful call.
    async fn submit(&self, body: &str) -> Result<ServiceResponse, TransportError>;
}

/// Receives evaluation progress.
///
/// A write error from `on_record_scored` or `on_complete` stops the run.
pub trait ProgressReporter: Send + Sync {
    /// A record was scored and the counters advanced.
    fn on_record_scored(
        &self,
        record: &QuestionRecord,
        outcome: Outcome,
        state: &EvaluationState,
    ) -> io::Result<()>;

    /// A request for `record` failed at the transport level and will be retried.
    fn on_retry(&self, record: &QuestionRecord, attempt: u32, error: &TransportError);

    /// The question bank is exhausted.
    fn on_complete(&self, state: &EvaluationState, elapsed: Duration) -> io::Result<()>;
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_record_scored(
        &self,
        _: &QuestionRecord,
        _: Outcome,
        _: &EvaluationState,
    ) -> io::Result<()> {
        Ok(())
    }
    fn on_retry(&self, _: &QuestionRecord, _: u32, _: &TransportError) {}
    fn on_complete(&self, _: &EvaluationState, _: Duration) -> io::Result<()> {
        Ok(())
    }
}
