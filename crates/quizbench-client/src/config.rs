//! Configuration loading and service factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizbench_core::retry::RetryPolicy;
use quizbench_core::traits::AnswerService;

use crate::http::{HttpAnswerService, DEFAULT_ENDPOINT};

/// Top-level quizbench configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizbenchConfig {
    /// URL every record is posted to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Line-delimited JSON question bank.
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
    /// Delay between transport retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Give up on a record after this many attempts. Unset retries forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Per-request timeout in seconds. Unset waits forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_question_bank() -> PathBuf {
    PathBuf::from("./question_bank.json")
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for QuizbenchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            question_bank: default_question_bank(),
            retry_delay_ms: default_retry_delay(),
            max_attempts: None,
            request_timeout_secs: None,
        }
    }
}

impl QuizbenchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.max_attempts {
            Some(max) => RetryPolicy::bounded(delay, max),
            None => RetryPolicy::unbounded(delay),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are never scanned again, so a value that itself
/// contains `${...}` is kept literally.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = lookup(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
        from = start + value.len();
    }
    result
}

/// Apply `QUIZBENCH_ENDPOINT` / `QUIZBENCH_QUESTION_BANK` overrides.
fn apply_env_overrides(config: &mut QuizbenchConfig, lookup: &impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup("QUIZBENCH_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(bank) = lookup("QUIZBENCH_QUESTION_BANK") {
        config.question_bank = PathBuf::from(bank);
    }
}

/// Expand `${VAR}` references in file values, then apply the overrides.
///
/// Override values are taken as-is.
fn finish_config(config: &mut QuizbenchConfig, lookup: impl Fn(&str) -> Option<String>) {
    config.endpoint = resolve_env_vars(&config.endpoint, &lookup);
    config.question_bank = PathBuf::from(resolve_env_vars(
        &config.question_bank.to_string_lossy(),
        &lookup,
    ));
    apply_env_overrides(config, &lookup);
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizbench.toml` in the current directory
/// 2. `~/.config/quizbench/config.toml`
///
/// Environment variable overrides: `QUIZBENCH_ENDPOINT`, `QUIZBENCH_QUESTION_BANK`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizbenchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizbench.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => QuizbenchConfig::default(),
    };

    finish_config(&mut config, |key| std::env::var(key).ok());

    tracing::debug!(
        source = ?config_path,
        endpoint = %config.endpoint,
        question_bank = %config.question_bank.display(),
        "loaded configuration"
    );
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<QuizbenchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<QuizbenchConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizbench"))
}

/// Create the HTTP answer service described by `config`.
pub fn create_service(config: &QuizbenchConfig) -> Result<Arc<dyn AnswerService>> {
    let service = HttpAnswerService::new(&config.endpoint, config.request_timeout())?;
    Ok(Arc::new(service))
}
