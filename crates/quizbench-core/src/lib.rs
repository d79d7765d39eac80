//! quizbench-core — Core evaluation loop, data model, and scoring.
//!
//! This crate defines the question-bank model, the service and reporter
//! traits, and the sequential evaluator that the rest of quizbench builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod retry;
pub mod traits;

pub use engine::{Evaluator, EvaluatorConfig};
pub use error::{EvalError, TransportError};
pub use model::{EvaluationState, Outcome, QuestionRecord, ServiceResponse};
pub use retry::RetryPolicy;
