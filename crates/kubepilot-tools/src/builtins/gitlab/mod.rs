//! GitLab - Issue, merge request and pipeline tools
//!
//! Every tool takes numeric ids as its leading fields and free text last, so a
//! description or comment may contain commas.

mod api;
mod client;
mod tools;

#[cfg(test)]
mod tests;

pub use api::{GitLabClient, GitLabConfig, DEFAULT_GITLAB_URL};
pub use client::{
    Group, Issue, IssueTracker, MergeRequest, MergeRequestDraft, Note, Noteable, Pipeline,
    Project,
};
pub use tools::{GitLabOperation, GitLabTool};

use crate::toolkit::Toolkit;
use std::sync::Arc;

/// Every issue-tracker tool
#[must_use]
pub fn toolkit(client: Arc<dyn IssueTracker>) -> Toolkit {
    GitLabOperation::ALL
        .into_iter()
        .fold(Toolkit::new("gitlab"), |toolkit, operation| {
            toolkit.with_tool(Arc::new(GitLabTool::new(operation, Arc::clone(&client))))
        })
}
