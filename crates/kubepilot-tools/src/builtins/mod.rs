//! Builtins - Domain tool adapters
//!
//! Each submodule owns one collaborator: a narrow client trait, a production
//! implementation of it, and the tools that expose its operations to a planner.
//! - `k8s`: cluster exploration (`k8s_*`)
//! - `git`: local working copies (`git_repository_*`)
//! - `gitlab`: issues, merge requests and pipelines (`gitlab_*`)
//! - `slack`: outbound chat messages (`slack_send_message`)
//! - `knowledge`: retrieval-augmented answers (`k8s_sme`)

pub mod git;
pub mod gitlab;
pub mod k8s;
pub mod knowledge;
pub mod slack;

pub use git::{GitCli, GitCredentials, SourceControl};
pub use gitlab::{GitLabClient, GitLabConfig, IssueTracker};
pub use k8s::{ClusterClient, ClusterConfig, ResourceKind, RestClusterClient};
pub use knowledge::{KnowledgeBase, KnowledgeTool, RetrievalQa};
pub use slack::{
    MessageSink, MessageTarget, OutgoingMessage, SharedMessageSink, SlackSendMessageTool,
};
