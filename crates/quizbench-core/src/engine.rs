//! Sequential evaluator.
//!
//! Submits every question-bank record to the answer service in file order,
//! scores each response, and reports the running accuracy after each record.
//! One request is in flight at a time.

use std::sync::Arc;
use std::time::Instant;

use crate::error::EvalError;
use crate::model::{score, EvaluationState, QuestionRecord, ServiceResponse};
use crate::retry::RetryPolicy;
use crate::traits::{AnswerService, ProgressReporter};

/// Configuration for the evaluator.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorConfig {
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
}

/// Drives the read, submit, score, report cycle.
pub struct Evaluator {
    service: Arc<dyn AnswerService>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(service: Arc<dyn AnswerService>, config: EvaluatorConfig) -> Self {
        Self { service, config }
    }

    /// Evaluate every record and return the final counters.
    ///
    /// A record error aborts the run before anything after it is submitted.
    pub async fn run<I>(
        &self,
        records: I,
        progress: &dyn ProgressReporter,
    ) -> Result<EvaluationState, EvalError>
    where
        I: IntoIterator<Item = Result<QuestionRecord, EvalError>>,
    {
        let start = Instant::now();
        let mut state = EvaluationState::default();

        tracing::info!(service = self.service.name(), "starting evaluation");

        for record in records {
            let record = record?;
            let response = self.submit_with_retry(&record, progress).await?;
            let outcome = score(&record.expected_answer, &response);
            state = state.advance(outcome);

            tracing::debug!(
                line = record.line,
                status = response.status,
                ?outcome,
                question = record.question.as_deref().unwrap_or(""),
                "scored record"
            );
            progress
                .on_record_scored(&record, outcome, &state)
                .map_err(|source| EvalError::Output { source })?;
        }

        let elapsed = start.elapsed();
        tracing::debug!(
            correct = state.correct_count,
            total = state.total_seen,
            elapsed_ms = elapsed.as_millis() as u64,
            "question bank exhausted"
        );
        progress
            .on_complete(&state, elapsed)
            .map_err(|source| EvalError::Output { source })?;
        Ok(state)
    }

    /// Send the record until the exchange completes, waiting a fixed delay
    /// between transport failures.
    async fn submit_with_retry(
        &self,
        record: &QuestionRecord,
        progress: &dyn ProgressReporter,
    ) -> Result<ServiceResponse, EvalError> {
        let policy = self.config.retry;
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            match self.service.submit(&record.raw).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if !policy.allows_retry(attempts) {
                        return Err(EvalError::RetriesExhausted {
                            line: record.line,
                            attempts,
                            last_error: error,
                        });
                    }
                    tracing::debug!(
                        line = record.line,
                        attempt = attempts,
                        %error,
                        "transport failure, retrying"
                    );
                    progress.on_retry(record, attempts, &error);
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }
}
