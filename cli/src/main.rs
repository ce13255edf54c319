//! # agent-search CLI
//!
//! Command-line interface for agent-search.
//!
//! ## Usage
//!
//! - `agent-search search review` - Find agent definitions named like "review"
//! - `agent-search search --commands git commit --any` - Search command definitions
//! - `agent-search search` - Browse the most popular definitions
//! - `agent-search browse owner/repo .claude/agents` - List a repository directory
//! - `agent-search browse owner/repo .claude/agents/review.md --read` - Preview a file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

mod commands;
mod config;

use commands::{browse_command, search_command, BrowseArgs, SearchArgs};
use config::CliConfigLoader;

/// agent-search - find agent and command definitions on GitHub
#[derive(Parser)]
#[command(name = "agent-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find, rank and collect agent and command definition files published on GitHub")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend to use (gh_cli, rest_api)
    #[arg(long, global = true, env = "AGENT_SEARCH_BACKEND")]
    backend: Option<String>,

    /// GitHub token override
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search definition files by filename keywords
    Search {
        /// Keywords; a single quoted argument is searched as a phrase
        keywords: Vec<String>,

        /// Match any keyword instead of all of them
        #[arg(long)]
        any: bool,

        /// Search command definitions instead of agents
        #[arg(long)]
        commands: bool,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a repository directory or preview a file
    Browse {
        /// Repository as owner/name
        repo: String,

        /// Path inside the repository (root when omitted)
        #[arg(default_value = "")]
        path: String,

        /// Print a preview of the file at PATH
        #[arg(long)]
        read: bool,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(backend) = &cli.backend {
        loader = loader.with_backend_override(backend.clone());
    }

    if let Some(token) = &cli.token {
        loader = loader.with_token_override(token.clone());
    }

    if let Commands::Search {
        limit: Some(limit), ..
    } = &cli.command
    {
        loader = loader.with_limit_override(*limit);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so JSON output stays clean
    agent_search_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    // Ctrl-C stops paging and returns what was found so far
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with results gathered so far");
            trigger.cancel();
        }
    });

    match cli.command {
        Commands::Search {
            keywords,
            any,
            commands,
            json,
            ..
        } => {
            search_command(
                SearchArgs {
                    keywords: keywords.join(" "),
                    any,
                    commands,
                    json,
                },
                config_loader,
                cancel,
            )
            .await
        }
        Commands::Browse {
            repo,
            path,
            read,
            json,
        } => {
            browse_command(
                BrowseArgs {
                    repo,
                    path,
                    read,
                    json,
                },
                config_loader,
            )
            .await
        }
    }
}
