#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use policygen::agents::{AgentFactory, AgentManager, ChatOutcome, RequestContext};
use policygen::config::Config;
use policygen::gateway::{self, AppState};
use policygen::memory::{self, ListMemoryStore};
use policygen::model;
use policygen::MemoryCommands;

/// `policygen` - privacy policy agents over one OpenAI-compatible endpoint.
#[derive(Parser, Debug)]
#[command(name = "policygen")]
#[command(version)]
#[command(about = "Privacy policy generation, compliance and readability agents.", long_about = None)]
struct Cli {
    /// Override the config directory (default: ~/.policygen)
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    #[command(long_about = "\
Start the HTTP gateway.

Serves the REST API under /api/v1: agent listing, explicit chat, \
intent-routed auto-chat, and the structured generate / check-compliance / \
check-readability endpoints. Bind address defaults to the values in your \
config file (gateway.host / gateway.port).

Examples:
  policygen serve                  # use config defaults
  policygen serve -p 8080          # listen on port 8080
  policygen serve --host 0.0.0.0   # bind to all interfaces")]
    Serve {
        /// Port to listen on; defaults to config gateway.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config gateway.host
        #[arg(long)]
        host: Option<String>,
    },

    /// List the available agents
    Agents,

    /// Show service status (model, memory, agent cache)
    Status,

    /// Send one message to an explicitly chosen agent
    #[command(long_about = "\
Send one message to an explicitly chosen agent.

The agent type must be one of: privacy_policy_generator, \
compliance_checker, readability_checker.

Examples:
  policygen chat privacy_policy_generator \"为健身应用生成隐私政策\"
  policygen chat compliance_checker \"Check this policy: ...\" --memory laws")]
    Chat {
        /// Agent type to dispatch to
        agent_type: String,

        /// The message to send
        message: String,

        /// Memory collections to load into the agent (repeatable)
        #[arg(long = "memory")]
        memory_files: Vec<String>,

        /// Opaque tool references to attach (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,
    },

    /// Route the message by intent keywords, then dispatch it
    #[command(long_about = "\
Route the message by intent keywords, then dispatch it.

Generation keywords pick the privacy_policy_generator, compliance \
keywords the compliance_checker, readability keywords the \
readability_checker. Messages with no keyword go to the generator.

Examples:
  policygen auto \"请帮我生成一个隐私政策\"
  policygen auto \"检查这个隐私政策是否合规\"")]
    Auto {
        /// The message to send
        message: String,
    },

    /// Manage memory collections (list, show, add, search, clear)
    Memory {
        #[command(subcommand)]
        memory_command: MemoryCommands,
    },

    /// Manage configuration
    #[command(long_about = "\
Manage policygen configuration.

Use 'schema' to dump the full JSON Schema for the config file, which \
documents every available key, type, and default value.

Examples:
  policygen config schema              # print JSON Schema to stdout
  policygen config schema > schema.json")]
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Dump the full configuration JSON Schema to stdout
    Schema,
}

fn build_state(config: Config) -> AppState {
    let config = Arc::new(config);
    let store = Arc::new(ListMemoryStore::new(config.memory.resolved_dir()));
    let client = model::create_model_client(&config);
    let manager = Arc::new(AgentManager::new(AgentFactory::new(client, store)));
    AppState { manager, config }
}

fn print_outcome(outcome: &ChatOutcome) -> Result<()> {
    if let Some(selected) = &outcome.selected_agent {
        println!("Selected agent: {selected}\n");
    }
    if outcome.success {
        if let Some(response) = &outcome.response {
            println!("{response}");
        }
        Ok(())
    } else {
        bail!("{}: {}", outcome.message, outcome.error.as_deref().unwrap_or("unknown error"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(config_dir) = &cli.config_dir {
        if config_dir.trim().is_empty() {
            bail!("--config-dir cannot be empty");
        }
        std::env::set_var("POLICYGEN_CONFIG_DIR", config_dir);
    }

    // Initialize logging - respects RUST_LOG env var, defaults to INFO
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // All commands need config loaded first
    let mut config = Config::load_or_init().await?;
    config.apply_env_overrides();

    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            info!("🚀 Starting policygen gateway on {host}:{port}");
            let state = build_state(config);
            gateway::run_gateway(&host, port, state).await
        }

        Commands::Agents => {
            let state = build_state(config);
            let agents = state.manager.available_agents();
            println!("Available agents ({} total):\n", agents.len());
            println!("  TYPE                        NAME                        STATUS");
            for agent in &agents {
                println!("  {:<27} {:<27} {}", agent.kind.as_str(), agent.name, agent.status);
            }
            Ok(())
        }

        Commands::Status => {
            let state = build_state(config);
            let status = state.manager.status();
            println!("🔏 policygen Status");
            println!();
            println!("Version:     {}", env!("CARGO_PKG_VERSION"));
            println!("Config:      {}", state.config.config_path.display());
            println!();
            println!("🤖 Model:       {}", state.config.model.name);
            println!("   Endpoint:    {}", state.config.model.api_url);
            println!(
                "   API key:     {}",
                if state.config.model.api_key.is_some() { "set" } else { "not set" }
            );
            println!("🧠 Memory dir:  {}", state.config.memory.resolved_dir().display());
            println!();
            println!("Agents ({} supported, {} cached):", status.total_agents, status.cached_agents);
            for (kind, info) in &status.agents {
                println!("  {:<27} {} [{}]", kind, info.name, info.status);
            }
            Ok(())
        }

        Commands::Chat { agent_type, message, memory_files, tools } => {
            let state = build_state(config);
            let context = RequestContext { tools, memory_files };
            let outcome = state.manager.process_request(&agent_type, &message, Some(&context)).await;
            print_outcome(&outcome)
        }

        Commands::Auto { message } => {
            let state = build_state(config);
            let outcome = state.manager.auto_process_request(&message, None).await;
            print_outcome(&outcome)
        }

        Commands::Memory { memory_command } => {
            memory::handle_memory_command(memory_command, &config).await
        }

        Commands::Config { config_command } => match config_command {
            ConfigCommands::Schema => {
                let schema = schemars::schema_for!(Config);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&schema).expect("failed to serialize JSON Schema")
                );
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_invocation_parses_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "policygen",
            "chat",
            "compliance_checker",
            "check this",
            "--memory",
            "laws",
            "--memory",
            "style",
            "--tool",
            "lookup",
        ])
        .expect("chat invocation should parse");

        match cli.command {
            Commands::Chat { agent_type, memory_files, tools, .. } => {
                assert_eq!(agent_type, "compliance_checker");
                assert_eq!(memory_files, vec!["laws".to_string(), "style".to_string()]);
                assert_eq!(tools, vec!["lookup".to_string()]);
            }
            other => panic!("expected chat command, got {other:?}"),
        }
    }

    #[test]
    fn memory_add_parses_with_default_kind() {
        let cli = Cli::try_parse_from(["policygen", "memory", "add", "laws", "PIPL article 13"])
            .expect("memory add invocation should parse");

        match cli.command {
            Commands::Memory { memory_command: MemoryCommands::Add { name, text, kind } } => {
                assert_eq!(name, "laws");
                assert_eq!(text, "PIPL article 13");
                assert_eq!(kind, "note");
            }
            other => panic!("expected memory add command, got {other:?}"),
        }
    }
}
