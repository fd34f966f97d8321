//! `kubepilot tools`: what the coordinator can reach

use crate::server::{collaborators, config::AppConfig, llm_provider};
use anyhow::{Context, Result};
use kubepilot_core::AgentFactory;

/// Print every configured sub-agent and its tools
pub async fn run(config: &AppConfig) -> Result<()> {
    let llm = llm_provider()?;
    let collaborators = collaborators(config, &llm).await;
    let factory = AgentFactory::new(llm, config.agent_settings(), collaborators)
        .context("Failed to build sub-agents")?;

    if factory.sub_agents().is_empty() {
        println!("No agents are configured.");
        return Ok(());
    }

    for agent in factory.sub_agents() {
        println!("{}", agent.name());
        for tool in agent.tool_names() {
            println!("  {}", tool);
        }
    }
    Ok(())
}
