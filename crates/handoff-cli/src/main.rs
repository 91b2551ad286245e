//! Handoff - delegate tasks to an expert agent
//!
//! Running `handoff` with no subcommand performs a diagnostic delegation
//! with a fixed sample prompt and prints the expert's result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use handoff_core::constants::{env, instructions};
use handoff_core::delegation::{ClaudeCliRuntime, Delegator, PermissionMode};
use handoff_core::instructions::load_instructions;
use handoff_core::routing::RoutingAgent;
use handoff_core::tools::{DelegateTaskTool, ToolRegistry};
use handoff_core::{paths, ExpertSettings, RoutingConfig};

mod logging;

const DIAGNOSTIC_PROMPT: &str = "What Skills are available?";
const DIAGNOSTIC_PERSONA: &str = "You are a helpful assistant";

/// Handoff - Expert Task Delegation
#[derive(Parser)]
#[command(name = "handoff")]
#[command(about = "Delegate tasks to an expert agent and aggregate its output", long_about = None)]
struct Cli {
    /// Directory holding instruction sets (<name>.md)
    #[arg(long, global = true)]
    instructions_dir: Option<PathBuf>,

    /// Directory the expert runs in; logs go to <working-dir>/logs
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Delegate one task to an expert and print its result
    Delegate {
        /// The prompt describing the task
        #[arg(short, long)]
        prompt: String,

        /// The system prompt describing the expert
        #[arg(short = 's', long)]
        persona: String,

        /// Ask before running tools instead of bypassing permissions
        #[arg(long)]
        restricted: bool,
    },

    /// Print the routing agent definition as JSON
    Routing,
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    let working_dir = cli
        .working_dir
        .clone()
        .or_else(|| env_path(env::WORKING_DIR))
        .unwrap_or_else(paths::default_working_dir);
    let instructions_dir = cli
        .instructions_dir
        .clone()
        .or_else(|| env_path(env::INSTRUCTIONS_DIR))
        .unwrap_or_else(paths::default_instructions_dir);

    logging::init(&working_dir)?;

    let common = load_instructions(&instructions_dir, instructions::COMMON)?;
    let runtime = ClaudeCliRuntime::from_env();
    tracing::info!("Expert runtime: {}", runtime.program());

    let mut settings = ExpertSettings::default().with_working_dir(&working_dir);
    if let Some(Commands::Delegate { restricted: true, .. }) = &cli.command {
        settings = settings.with_permission_mode(PermissionMode::Restricted);
    }

    let delegator = Delegator::new(Arc::new(runtime), common).with_settings(settings);
    tracing::debug!("Expert settings: {:?}", delegator.settings());

    match cli.command {
        Some(Commands::Delegate { prompt, persona, .. }) => {
            run_delegation(&delegator, &prompt, &persona).await?;
        }
        Some(Commands::Routing) => {
            let instruction = load_instructions(&instructions_dir, instructions::MAIN_AGENT)?;

            let mut tools = ToolRegistry::new();
            tools.register(Arc::new(DelegateTaskTool::new(Arc::new(delegator))));

            let agent = RoutingAgent::new(&RoutingConfig::from_env(), instruction, &tools);
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }
        None => {
            run_delegation(&delegator, DIAGNOSTIC_PROMPT, DIAGNOSTIC_PERSONA).await?;
        }
    }

    Ok(())
}

async fn run_delegation(delegator: &Delegator, prompt: &str, persona: &str) -> Result<()> {
    match delegator.delegate(prompt, persona).await? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => println!("null"),
    }
    Ok(())
}
