//! The `quizbench run` command.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use quizbench_client::{create_service, load_config_from};
use quizbench_core::engine::{Evaluator, EvaluatorConfig};
use quizbench_core::error::{EvalError, TransportError};
use quizbench_core::model::{EvaluationState, Outcome, QuestionRecord};
use quizbench_core::parser::QuestionBank;
use quizbench_core::traits::ProgressReporter;

/// Rewrites a single stdout line in place after every record.
#[derive(Default)]
struct ConsoleReporter {
    line_open: AtomicBool,
}

impl ConsoleReporter {
    /// Terminate the progress line, if one has been started.
    fn end_line(&self) -> io::Result<()> {
        if self.line_open.swap(false, Ordering::Relaxed) {
            let mut out = io::stdout().lock();
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_record_scored(
        &self,
        _: &QuestionRecord,
        _: Outcome,
        state: &EvaluationState,
    ) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.line_open.store(true, Ordering::Relaxed);
        write!(out, "\r{state}")?;
        out.flush()
    }

    // Transport failures only stall the progress line.
    fn on_retry(&self, _: &QuestionRecord, _: u32, _: &TransportError) {}

    fn on_complete(&self, state: &EvaluationState, elapsed: Duration) -> io::Result<()> {
        self.end_line()?;
        tracing::info!(
            correct = state.correct_count,
            total = state.total_seen,
            accuracy = %format!("{:.2}", state.accuracy_percent()),
            elapsed_ms = elapsed.as_millis() as u64,
            "evaluation complete"
        );
        Ok(())
    }
}

pub async fn execute(
    question_bank: Option<PathBuf>,
    endpoint: Option<String>,
    retry_delay_ms: Option<u64>,
    max_attempts: Option<u32>,
    timeout_secs: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;

    // Flags win over config file and environment
    if let Some(path) = question_bank {
        config.question_bank = path;
    }
    if let Some(url) = endpoint {
        config.endpoint = url;
    }
    if let Some(ms) = retry_delay_ms {
        config.retry_delay_ms = ms;
    }
    if max_attempts.is_some() {
        config.max_attempts = max_attempts;
    }
    if timeout_secs.is_some() {
        config.request_timeout_secs = timeout_secs;
    }

    anyhow::ensure!(
        config.max_attempts != Some(0),
        "max attempts must be at least 1"
    );
    anyhow::ensure!(
        config.request_timeout_secs != Some(0),
        "request timeout must be at least 1 second"
    );

    let records = QuestionBank::open(&config.question_bank)?;
    let service = create_service(&config)?;
    let evaluator = Evaluator::new(
        service,
        EvaluatorConfig {
            retry: config.retry_policy(),
        },
    );

    tracing::info!(
        question_bank = %config.question_bank.display(),
        endpoint = %config.endpoint,
        "evaluating question bank"
    );

    let reporter = ConsoleReporter::default();
    match evaluator.run(records, &reporter).await {
        Ok(_) => Ok(()),
        // stdout is already broken; nothing more to write there
        Err(err @ EvalError::Output { .. }) => Err(err.into()),
        Err(err) => {
            // Keep `Error:` off the progress line
            reporter.end_line()?;
            Err(err.into())
        }
    }
}
