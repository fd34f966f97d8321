//! CLI module for Kubepilot
//!
//! Provides the commands:
//! - `serve`: run the Slack bridge
//! - `chat` / `ask`: talk to the coordinator from a terminal
//! - `index`: rebuild the documentation index
//! - `tools`: list the agents and their tools

use crate::server::config::AppConfig;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod index;
pub mod tools;

/// Kubepilot operations assistant CLI
#[derive(Parser, Debug)]
#[command(name = "kubepilot")]
#[command(about = "Natural-language assistant for Kubernetes, git and GitLab")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Slack bridge
    Serve,
    /// Interactive terminal session
    Chat,
    /// Answer a single question
    Ask {
        /// The question, in plain language
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Rebuild the documentation index
    Index {
        /// Document URL or local path; defaults to knowledge.doc_url or K8S_DOC_URL
        #[arg(long)]
        url: Option<String>,
    },
    /// List the agents and their tools
    Tools,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run(config).await,
        Some(Commands::Chat) => chat::run(&config).await,
        Some(Commands::Ask { text }) => chat::ask(&config, &text.join(" ")).await,
        Some(Commands::Index { url }) => index::run(&config, url).await,
        Some(Commands::Tools) => tools::run(&config).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
