//! quizbench-client — Answer-service integrations.
//!
//! Implements the `AnswerService` trait over HTTP, provides a scripted
//! in-memory service for tests, and loads quizbench configuration.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_service, load_config_from, QuizbenchConfig};
pub use http::HttpAnswerService;
pub use mock::ScriptedService;
