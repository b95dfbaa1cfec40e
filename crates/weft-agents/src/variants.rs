//! Built-in agent variants.
//!
//! Each variant is a flat composition over the base lifecycle: it holds its
//! collaborators (resolver, generator, sink) and overrides only the stages
//! whose behavior it changes. Identities are fixed per variant type.

use std::sync::Arc;

use serde_json::json;
use weft_core::types::{AgentIdentity, ParsedResult, ProcessingInput};
use weft_personas::resolver::ResolvePersona;
use weft_personas::template::PromptTemplate;

use crate::generator::{Generator, RetryPolicy};
use crate::lifecycle::{Agent, AgentError, Result};
use crate::sink::ResultSink;

// ---------------------------------------------------------------------------
// PlainAgent — no stage overridden
// ---------------------------------------------------------------------------

/// The unspecialized variant: every stage keeps the base behavior. Runs
/// resolve the persona, produce the minimal result, and persist nothing.
pub struct PlainAgent {
    identity: AgentIdentity,
    resolver: Arc<dyn ResolvePersona>,
}

impl PlainAgent {
    pub const NAME: &'static str = "Plain";

    pub fn new(resolver: Arc<dyn ResolvePersona>) -> Self {
        Self {
            identity: AgentIdentity::new(Self::NAME),
            resolver,
        }
    }
}

#[async_trait::async_trait]
impl Agent for PlainAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn resolver(&self) -> &dyn ResolvePersona {
        self.resolver.as_ref()
    }
}

// ---------------------------------------------------------------------------
// SummarizerAgent — overrides process_data and save_parsed_result
// ---------------------------------------------------------------------------

/// Extracts a fixed-length prefix of the `text` input as the summary and
/// appends every result to its sink.
pub struct SummarizerAgent {
    identity: AgentIdentity,
    resolver: Arc<dyn ResolvePersona>,
    sink: Arc<dyn ResultSink>,
    max_len: usize,
}

impl SummarizerAgent {
    pub const NAME: &'static str = "Summarizer";
    const DEFAULT_MAX_LEN: usize = 10;

    pub fn new(resolver: Arc<dyn ResolvePersona>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            identity: AgentIdentity::new(Self::NAME),
            resolver,
            sink,
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }
}

#[async_trait::async_trait]
impl Agent for SummarizerAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn resolver(&self) -> &dyn ResolvePersona {
        self.resolver.as_ref()
    }

    async fn process_data(&self, input: &ProcessingInput) -> Result<ParsedResult> {
        let text = input
            .get_str("text")
            .ok_or_else(|| AgentError::ProcessingFailed {
                input: input.clone(),
                reason: "missing string field `text`".into(),
            })?;
        let summary: String = text.chars().take(self.max_len).collect();
        Ok(ParsedResult::new(
            self.identity.clone(),
            json!({ "summary": summary }),
        ))
    }

    async fn save_parsed_result(&self, result: &ParsedResult) -> Result<()> {
        self.sink
            .save(result)
            .await
            .map_err(|e| AgentError::PersistenceFailed {
                result: result.clone(),
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// GeneratorAgent — overrides process_data to call a model backend
// ---------------------------------------------------------------------------

/// Renders the persona prompt over the run input and sends it to a
/// generator backend, retrying transient failures per its policy. The
/// completion becomes the result payload.
pub struct GeneratorAgent {
    identity: AgentIdentity,
    resolver: Arc<dyn ResolvePersona>,
    generator: Arc<dyn Generator>,
    policy: RetryPolicy,
}

impl GeneratorAgent {
    pub const NAME: &'static str = "Generator";

    pub fn new(resolver: Arc<dyn ResolvePersona>, generator: Arc<dyn Generator>) -> Self {
        Self {
            identity: AgentIdentity::new(Self::NAME),
            resolver,
            generator,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait::async_trait]
impl Agent for GeneratorAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn resolver(&self) -> &dyn ResolvePersona {
        self.resolver.as_ref()
    }

    async fn process_data(&self, input: &ProcessingInput) -> Result<ParsedResult> {
        // The prepared prompt keeps unknown placeholders intact; fill them
        // from this run's input before hitting the backend.
        let prompt = self.prepare_prompt().await?;
        let rendered = PromptTemplate::inline(prompt.content).render_input(input);

        let completion = self
            .policy
            .run(self.generator.as_ref(), &rendered)
            .await
            .map_err(|e| AgentError::ProcessingFailed {
                input: input.clone(),
                reason: e.to_string(),
            })?;

        Ok(ParsedResult::new(
            self.identity.clone(),
            json!({ "completion": completion }),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
