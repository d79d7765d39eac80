//! Core data model types for quizbench.
//!
//! A question bank is a sequence of [`QuestionRecord`]s. Each record is sent
//! to the answer service, the [`ServiceResponse`] is scored into an
//! [`Outcome`], and the outcome advances the [`EvaluationState`].

use std::fmt;

/// HTTP status that counts as an answered question.
pub const STATUS_OK: u16 = 200;

/// One decoded line of the question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    /// 1-based line number in the question bank.
    pub line: usize,
    /// The trimmed line text. Sent verbatim as the request body.
    pub raw: String,
    /// The `^` field.
    pub expected_answer: String,
    /// The `#Q` field, if present.
    pub question: Option<String>,
    /// String-valued `A`..`D` fields, in that order.
    pub choices: Vec<String>,
}

/// Status and body returned by the answer service for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// How a single response was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Status 200 and the body equals the expected answer.
    Correct,
    /// Status 200 but the body differs from the expected answer.
    WrongAnswer,
    /// Any status other than 200.
    BadStatus { status: u16 },
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

/// Score a response against the expected answer.
///
/// Comparison is exact string equality with no trimming or case folding.
pub fn score(expected: &str, response: &ServiceResponse) -> Outcome {
    if response.status != STATUS_OK {
        Outcome::BadStatus {
            status: response.status,
        }
    } else if response.body == expected {
        Outcome::Correct
    } else {
        Outcome::WrongAnswer
    }
}

/// Running counters for an evaluation.
///
/// Invariant: `correct_count <= total_seen`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationState {
    pub total_seen: u64,
    pub correct_count: u64,
}

impl EvaluationState {
    /// Fold one scored record into the counters.
    #[must_use]
    pub fn advance(self, outcome: Outcome) -> Self {
        Self {
            total_seen: self.total_seen + 1,
            correct_count: self.correct_count + u64::from(outcome.is_correct()),
        }
    }

    /// `correct_count / total_seen * 100`, or 0.0 before any record is seen.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_seen == 0 {
            return 0.0;
        }
        (self.correct_count as f64 / self.total_seen as f64) * 100.0
    }
}

impl fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Got {} correct out of {} which is {:.2}",
            self.correct_count,
            self.total_seen,
            self.accuracy_percent()
        )
    }
}
