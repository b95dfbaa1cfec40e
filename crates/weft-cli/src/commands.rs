use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use weft_agents::generator::{EchoGenerator, RetryPolicy};
use weft_agents::lifecycle::Agent;
use weft_agents::sink::{MemorySink, ResultSink};
use weft_agents::variants::{GeneratorAgent, PlainAgent, SummarizerAgent};
use weft_core::config::Config;
use weft_core::types::ProcessingInput;
use weft_personas::loader::PersonaDirLoader;
use weft_personas::resolver::{CachingResolver, ResolvePersona, StoreResolver};
use weft_personas::store::PersonaStore;

/// List every persona in the directory with its role, if any.
pub fn personas(dir: &Path) -> anyhow::Result<()> {
    let store = PersonaDirLoader::new(dir)
        .load()
        .with_context(|| format!("loading personas from {}", dir.display()))?;

    let mut names = store.names();
    names.sort();
    if names.is_empty() {
        println!("no personas found in {}", dir.display());
        return Ok(());
    }
    for name in names {
        if let Some(def) = store.lookup(&name) {
            match def.role {
                Some(role) => println!("{name}  ({role})"),
                None => println!("{name}"),
            }
        }
    }
    Ok(())
}

/// Run one pipeline for the named variant and print the report as JSON.
pub async fn run(config: &Config, dir: &Path, agent: &str, inputs: &[String]) -> anyhow::Result<()> {
    let store = PersonaDirLoader::new(dir)
        .load()
        .with_context(|| format!("loading personas from {}", dir.display()))?;
    let resolver: Arc<dyn ResolvePersona> = Arc::new(CachingResolver::new(Arc::new(
        StoreResolver::new(Arc::new(store)),
    )));

    let input = parse_inputs(inputs)?;

    let sink = Arc::new(MemorySink::new());
    let agent: Box<dyn Agent> = match agent {
        PlainAgent::NAME => Box::new(PlainAgent::new(resolver)),
        SummarizerAgent::NAME => Box::new(SummarizerAgent::new(
            resolver,
            Arc::clone(&sink) as Arc<dyn ResultSink>,
        )),
        GeneratorAgent::NAME => Box::new(
            GeneratorAgent::new(resolver, Arc::new(EchoGenerator))
                .with_policy(RetryPolicy::from_config(&config.generator)),
        ),
        other => anyhow::bail!(
            "unknown agent variant `{other}` (expected {}, {}, or {})",
            PlainAgent::NAME,
            SummarizerAgent::NAME,
            GeneratorAgent::NAME
        ),
    };

    let report = agent.run(input).await?;
    info!(agent = %report.identity, state = %report.state, "run finished");
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !sink.is_empty() {
        println!("saved {} result(s)", sink.len());
    }
    Ok(())
}

/// Parse `key=value` pairs into a processing input.
fn parse_inputs(pairs: &[String]) -> anyhow::Result<ProcessingInput> {
    let mut input = ProcessingInput::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid input `{pair}` (expected key=value)"))?;
        input.insert(key, value);
    }
    Ok(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
