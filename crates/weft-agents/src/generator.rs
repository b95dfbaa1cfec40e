//! Generative-model backend boundary.
//!
//! The base lifecycle never talks to a model; stage-1 or stage-2 overrides
//! do, through [`Generator`]. Transient backend failures (rate limits,
//! connection drops) are worth retrying with backoff; everything else is
//! terminal for the call.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;
use weft_core::config::GeneratorConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("connection: {0}")]
    Connection(String),
    #[error("backend: {0}")]
    Backend(String),
}

impl GeneratorError {
    /// Rate limits and connection drops are transient; backend errors are
    /// terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::RateLimited(_) | GeneratorError::Connection(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

/// A generative backend: prompt text in, completion text out.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Bounded retries with exponential backoff for retryable generator
/// failures. Attempt numbering is 1-based; `max_attempts` includes the
/// first try.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
        )
    }

    /// Backoff before retrying after `attempt` failed: base × 2^(attempt-1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Call the generator, retrying retryable failures up to the bound. The
    /// final error is returned when every attempt fails.
    pub async fn run(
        &self,
        generator: &dyn Generator,
        prompt: &str,
    ) -> Result<String, GeneratorError> {
        let mut attempt = 1;
        loop {
            match generator.generate(prompt).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "generator call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

// ---------------------------------------------------------------------------
// EchoGenerator
// ---------------------------------------------------------------------------

/// Returns the prompt back as the completion. Useful for demos and for
/// wiring tests that need a backend with no external dependency.
#[derive(Debug, Default)]
pub struct EchoGenerator;

#[async_trait::async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        Ok(prompt.to_string())
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// Replays a fixed sequence of responses, one per call. Once the script is
/// exhausted every further call fails.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GeneratorError>>>,
    calls: Mutex<u32>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, GeneratorError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(GeneratorError::Backend("script exhausted".into())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
