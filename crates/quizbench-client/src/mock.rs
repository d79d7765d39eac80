//! Scripted answer service for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizbench_core::error::TransportError;
use quizbench_core::model::{ServiceResponse, STATUS_OK};
use quizbench_core::parser::parse_record;
use quizbench_core::traits::AnswerService;

/// What to answer once the script runs out.
#[derive(Debug, Clone)]
enum Fallback {
    Fixed(ServiceResponse),
    /// Answer every record with its own `^` field.
    Oracle,
}

/// An answer service that replays a queue of scripted results.
///
/// Each call pops the next entry. Once the queue is empty the fallback
/// answers. Every request body is recorded.
pub struct ScriptedService {
    script: Mutex<VecDeque<Result<ServiceResponse, TransportError>>>,
    fallback: Fallback,
    call_count: AtomicU32,
    bodies: Mutex<Vec<String>>,
}

impl ScriptedService {
    /// Replay `script`, then answer 200 with an empty body.
    pub fn new(script: Vec<Result<ServiceResponse, TransportError>>) -> Self {
        Self::with_fallback(script, Fallback::Fixed(ServiceResponse::new(STATUS_OK, "")))
    }

    /// Always answer with the same status and body.
    pub fn always(status: u16, body: &str) -> Self {
        Self::with_fallback(Vec::new(), Fallback::Fixed(ServiceResponse::new(status, body)))
    }

    /// Always answer correctly. Bodies that do not decode get a 400.
    pub fn oracle() -> Self {
        Self::with_fallback(Vec::new(), Fallback::Oracle)
    }

    /// Replay `script`, then answer correctly.
    pub fn then_oracle(script: Vec<Result<ServiceResponse, TransportError>>) -> Self {
        Self::with_fallback(script, Fallback::Oracle)
    }

    fn with_fallback(
        script: Vec<Result<ServiceResponse, TransportError>>,
        fallback: Fallback,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            call_count: AtomicU32::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    /// Number of submissions received, including ones that failed.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Every request body received, in order.
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    fn fallback_reply(&self, body: &str) -> ServiceResponse {
        match &self.fallback {
            Fallback::Fixed(response) => response.clone(),
            Fallback::Oracle => match parse_record(0, body) {
                Ok(record) => ServiceResponse::new(STATUS_OK, record.expected_answer),
                Err(e) => ServiceResponse::new(400, e.to_string()),
            },
        }
    }
}

#[async_trait]
impl AnswerService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit(&self, body: &str) -> Result<ServiceResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.bodies.lock().unwrap().push(body.to_owned());

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(self.fallback_reply(body)),
        }
    }
}
