//! Server initialization and main run loop
//!
//! Every client is built once here and shared by `Arc`. A collaborator that
//! cannot be configured is logged and left out; its sub-agent is then skipped.

use super::config::AppConfig;
use anyhow::{Context, Result};
use kubepilot_channels::{SlackBridge, SlackConfig, SlackMessageSink};
use kubepilot_core::{AgentFactory, Collaborators, Coordinator};
use kubepilot_llm::{
    LlmProvider, OpenAiEmbeddings, OpenAiProvider, SharedEmbeddingProvider, SharedLlmProvider,
};
use kubepilot_search::DocumentIndex;
use kubepilot_tools::builtins::{
    ClusterClient, ClusterConfig, GitCli, GitCredentials, GitLabClient, GitLabConfig,
    IssueTracker, KnowledgeBase, RestClusterClient, RetrievalQa, SharedMessageSink,
    SourceControl,
};
use std::sync::Arc;
use tracing::{info, warn};

/// The completion provider, from `OPENAI_*`
pub fn llm_provider() -> Result<SharedLlmProvider> {
    let provider = OpenAiProvider::from_env().context("Failed to configure the OpenAI provider")?;
    info!("LLM provider initialized: {}", provider.name());
    Ok(Arc::new(provider))
}

/// The embedding provider used by the documentation index
pub fn embedder(config: &AppConfig) -> Result<SharedEmbeddingProvider> {
    let embeddings = OpenAiEmbeddings::from_env(&config.llm.embedding_model)
        .context("Failed to configure OpenAI embeddings")?;
    Ok(Arc::new(embeddings))
}

/// Build every collaborator that can be configured
pub async fn collaborators(config: &AppConfig, llm: &SharedLlmProvider) -> Collaborators {
    Collaborators {
        cluster: cluster_client().await,
        source_control: Some(source_control(config)),
        issue_tracker: issue_tracker(config),
        knowledge: knowledge_base(config, llm),
    }
}

async fn cluster_client() -> Option<Arc<dyn ClusterClient>> {
    let client = async { RestClusterClient::new(ClusterConfig::discover().await?) };
    match client.await {
        Ok(client) => {
            info!("Cluster client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "Cluster client not available");
            None
        }
    }
}

fn source_control(config: &AppConfig) -> Arc<dyn SourceControl> {
    let credentials = GitCredentials::from_env();
    if credentials.is_none() {
        warn!("GIT_PASSWORD not set, remotes are used without credentials");
    }
    info!(workspace = %config.git.workspace_dir.display(), "Git workspace");
    Arc::new(GitCli::new(config.git.workspace_dir.clone(), credentials))
}

fn issue_tracker(config: &AppConfig) -> Option<Arc<dyn IssueTracker>> {
    match GitLabConfig::from_env(&config.gitlab.url).and_then(GitLabClient::new) {
        Ok(client) => {
            info!("GitLab client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "GitLab client not available");
            None
        }
    }
}

fn knowledge_base(config: &AppConfig, llm: &SharedLlmProvider) -> Option<Arc<dyn KnowledgeBase>> {
    let dir = &config.knowledge.index_dir;
    if !DocumentIndex::exists(dir) {
        warn!(
            index_dir = %dir.display(),
            "No documentation index, run `kubepilot index` to build one"
        );
        return None;
    }

    let loaded = DocumentIndex::load(dir)
        .context("Failed to load the documentation index")
        .and_then(|index| Ok((index, embedder(config)?)));
    match loaded {
        Ok((index, embedder)) => {
            info!(chunks = index.len(), "Documentation index loaded");
            let qa = RetrievalQa::new(embedder, Arc::clone(llm), index)
                .with_model(&config.llm.model)
                .with_top_k(config.knowledge.top_k)
                .with_max_tokens(config.llm.max_tokens);
            Some(Arc::new(qa))
        }
        Err(e) => {
            warn!(error = %e, "Documentation index not available");
            None
        }
    }
}

/// Build the coordinator and its sub-agents
pub async fn build_coordinator(
    config: &AppConfig,
    sink: Option<SharedMessageSink>,
    default_channel: Option<String>,
) -> Result<Coordinator> {
    let llm = llm_provider()?;
    let collaborators = collaborators(config, &llm).await;
    let factory = AgentFactory::new(llm, config.agent_settings(), collaborators)
        .context("Failed to build sub-agents")?;

    let mut coordinator = Coordinator::new(factory);
    if let Some(sink) = sink {
        coordinator = coordinator.with_message_sink(sink);
    }
    if let Some(channel) = default_channel {
        coordinator = coordinator.with_default_channel(channel);
    }
    Ok(coordinator)
}

/// Run the Slack bridge until it stops or Ctrl-C
pub async fn run(config: AppConfig) -> Result<()> {
    info!(
        "Starting Kubepilot Slack bridge v{}",
        env!("CARGO_PKG_VERSION")
    );

    let slack_config = SlackConfig::from_env().context("Slack is not configured")?;
    let sink: SharedMessageSink = Arc::new(
        SlackMessageSink::new(&slack_config).context("Failed to create Slack client")?,
    );

    let coordinator = build_coordinator(
        &config,
        Some(Arc::clone(&sink)),
        slack_config.default_channel.clone(),
    )
    .await?;
    info!(
        agents = ?coordinator
            .factory()
            .sub_agents()
            .iter()
            .map(|a| a.name().to_string())
            .collect::<Vec<_>>(),
        "Coordinator ready"
    );

    let bridge = Arc::new(SlackBridge::new(slack_config, sink, Arc::new(coordinator)));

    tokio::select! {
        result = bridge.run() => result.context("Slack bridge stopped")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
