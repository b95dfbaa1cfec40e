mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use weft_core::config::Config;

/// weft CLI -- run persona-driven agent pipelines from the shell.
#[derive(Parser)]
#[command(name = "weft", version, about)]
struct Cli {
    /// Config file path (defaults to `~/.weft/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the personas available in the persona directory.
    Personas {
        /// Persona directory (overrides config).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Run one agent pipeline over key=value inputs.
    Run {
        /// Agent variant to run (Plain, Summarizer, or Generator).
        /// Falls back to `general.default_agent` from config.
        agent: Option<String>,

        /// Persona directory (overrides config).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Input values as key=value pairs.
        #[arg(short, long)]
        input: Vec<String>,
    },
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_logging(&config.general.log_level);

    match cli.command {
        Commands::Personas { dir } => {
            let dir = dir.unwrap_or_else(|| config.personas.dir.clone());
            commands::personas(&dir)
        }
        Commands::Run { agent, dir, input } => {
            let dir = dir.unwrap_or_else(|| config.personas.dir.clone());
            let agent = agent
                .or_else(|| config.general.default_agent.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("no agent named; pass one or set general.default_agent")
                })?;
            commands::run(&config, &dir, &agent, &input).await
        }
    }
}
