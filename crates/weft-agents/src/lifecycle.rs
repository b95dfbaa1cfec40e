//! The base agent lifecycle and its extension contract.
//!
//! [`Agent`] fixes a three-stage pipeline (prepare prompt → process data →
//! save result) behind one orchestration entry point, [`Agent::run`]. Each
//! stage is a provided method a variant may override independently; stages
//! that are not overridden keep exactly the base behavior. `run` itself is
//! not meant to be overridden — replacing it forfeits the shared lifecycle
//! guarantee.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use weft_core::types::{AgentIdentity, ParsedResult, ProcessingInput};
use weft_personas::resolver::{ResolveError, ResolvePersona};

use crate::state_machine::{PipelineStateMachine, RunEvent, RunState, Stage};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Everything a pipeline run can fail with, keyed by stage.
///
/// The orchestration performs no recovery or retry: each of these surfaces
/// verbatim from [`Agent::run`]. A no-op default stage is never an error
/// path — absence of an override is not a failure.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Stage 1: the resolver found no persona for this identity.
    #[error("no persona for agent `{identity}`")]
    PersonaNotFound {
        identity: AgentIdentity,
        #[source]
        source: ResolveError,
    },

    /// Stage 1: the persona resolved but no usable prompt could be built
    /// from it (e.g. malformed template content).
    #[error("prompt not available for agent `{identity}`: {reason}")]
    PromptNotAvailable {
        identity: AgentIdentity,
        reason: String,
    },

    /// Stage 2: the input could not be processed. Carries the original
    /// input so callers can inspect or requeue it.
    #[error("processing failed: {reason}")]
    ProcessingFailed {
        input: ProcessingInput,
        reason: String,
    },

    /// Stage 3: the parsed result could not be persisted. Carries the
    /// result so nothing is lost with the failure.
    #[error("persistence failed: {reason}")]
    PersistenceFailed {
        result: ParsedResult,
        reason: String,
    },
}

impl AgentError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            AgentError::PersonaNotFound { .. } | AgentError::PromptNotAvailable { .. } => {
                Stage::PreparePrompt
            }
            AgentError::ProcessingFailed { .. } => Stage::ProcessData,
            AgentError::PersistenceFailed { .. } => Stage::SaveResult,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// A prompt bound to the agent identity it was prepared for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub identity: AgentIdentity,
    pub content: String,
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// The outcome of one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub identity: AgentIdentity,
    /// Always `Completed` for a report; failures surface as [`AgentError`].
    pub state: RunState,
    pub prompt: Prompt,
    pub result: ParsedResult,
}

// ---------------------------------------------------------------------------
// Agent trait
// ---------------------------------------------------------------------------

/// The base lifecycle. Variants implement `identity` and `resolver`, then
/// override any subset of the three stages; a caller holding `&dyn Agent`
/// invokes [`Agent::run`] uniformly regardless of which stages are
/// overridden.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// The variant's declared name, fixed at definition time.
    fn identity(&self) -> &AgentIdentity;

    /// The persona resolver this instance was constructed with.
    fn resolver(&self) -> &dyn ResolvePersona;

    /// Stage 1: produce the prompt for this run.
    ///
    /// Default: resolve this identity's persona and compose its prompt.
    /// Fails with [`AgentError::PersonaNotFound`] when resolution fails and
    /// [`AgentError::PromptNotAvailable`] when the persona content cannot be
    /// rendered into a prompt. Overrides must produce a prompt or fail —
    /// never silently return nothing.
    async fn prepare_prompt(&self) -> Result<Prompt> {
        let identity = self.identity().clone();
        let definition = self
            .resolver()
            .resolve(&identity)
            .map_err(|source| AgentError::PersonaNotFound {
                identity: identity.clone(),
                source,
            })?;
        definition
            .template
            .validate()
            .map_err(|e| AgentError::PromptNotAvailable {
                identity: identity.clone(),
                reason: e.to_string(),
            })?;
        let content = definition.to_prompt(&HashMap::new());
        Ok(Prompt { identity, content })
    }

    /// Stage 2: turn the input into a parsed result. Primary extension
    /// point.
    ///
    /// Default: no domain logic is assumed; any well-formed input maps to
    /// the minimal valid result. Overrides that cannot process an input
    /// must fail with [`AgentError::ProcessingFailed`] carrying that input,
    /// never return a partially-populated result.
    async fn process_data(&self, input: &ProcessingInput) -> Result<ParsedResult> {
        let _ = input;
        Ok(ParsedResult::empty(self.identity().clone()))
    }

    /// Stage 3: persist the parsed result.
    ///
    /// Default: no durable action. The pipeline calls this exactly once per
    /// run that reaches it, with the stage-2 result unmodified.
    async fn save_parsed_result(&self, result: &ParsedResult) -> Result<()> {
        let _ = result;
        Ok(())
    }

    /// Orchestration: one pipeline run. Not overridable by convention.
    ///
    /// Stages execute strictly in order. A stage-1 failure skips stages 2–3;
    /// a stage-2 failure skips stage 3; stage-3 failures surface as-is. The
    /// run's state machine ends in `Completed` or `Failed(stage)` and every
    /// transition is traced. Instances are reusable: each call builds a
    /// fresh machine and carries no state between runs.
    async fn run(&self, input: ProcessingInput) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let identity = self.identity().clone();
        let mut machine = PipelineStateMachine::new();

        machine
            .transition(RunEvent::Begin)
            .expect("fresh pipeline accepts Begin");
        tracing::info!(run_id = %run_id, agent = %identity, "pipeline run started");

        let prompt = match self.prepare_prompt().await {
            Ok(prompt) => {
                machine
                    .transition(RunEvent::PromptReady)
                    .expect("prompt stage accepts PromptReady");
                prompt
            }
            Err(e) => return Err(fail_run(&mut machine, run_id, e)),
        };

        let result = match self.process_data(&input).await {
            Ok(result) => {
                machine
                    .transition(RunEvent::ResultParsed)
                    .expect("processing stage accepts ResultParsed");
                result
            }
            Err(e) => return Err(fail_run(&mut machine, run_id, e)),
        };

        if let Err(e) = self.save_parsed_result(&result).await {
            return Err(fail_run(&mut machine, run_id, e));
        }
        machine
            .transition(RunEvent::ResultSaved)
            .expect("saving stage accepts ResultSaved");

        tracing::info!(
            run_id = %run_id,
            agent = %identity,
            state = %machine.state(),
            "pipeline run completed"
        );

        Ok(RunReport {
            run_id,
            identity,
            state: machine.state(),
            prompt,
            result,
        })
    }
}

/// Drive the machine to `Failed(stage)` and hand the error back unchanged.
fn fail_run(machine: &mut PipelineStateMachine, run_id: Uuid, error: AgentError) -> AgentError {
    let stage = error.stage();
    machine
        .transition(RunEvent::Fail(stage))
        .expect("non-terminal state accepts Fail");
    tracing::warn!(run_id = %run_id, stage = %stage, error = %error, "pipeline run failed");
    error
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
