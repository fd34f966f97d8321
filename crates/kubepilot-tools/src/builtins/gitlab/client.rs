//! Issue-tracker interface and the records it returns

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A group (namespace of projects)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    /// Numeric id
    pub id: i64,
    /// Display name
    pub name: String,
}

/// A project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Project {
    /// Numeric id
    pub id: i64,
    /// Display name
    pub name: String,
}

/// An issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Issue {
    /// Project-local issue number
    pub iid: i64,
    /// Title
    pub title: String,
    /// `opened` or `closed`
    #[serde(default)]
    pub state: String,
    /// Labels
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A merge request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MergeRequest {
    /// Project-local merge request number
    pub iid: i64,
    /// Title
    pub title: String,
    /// `opened`, `merged`, `closed`
    #[serde(default)]
    pub state: String,
}

/// A comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    /// Note id
    pub id: i64,
    /// Markdown body
    pub body: String,
}

/// A pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pipeline {
    /// Pipeline id
    pub id: i64,
    /// `created`, `pending`, `running`, ...
    pub status: String,
}

/// Fields of a new merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequestDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Branch with the changes
    pub source_branch: String,
    /// Branch to merge into
    pub target_branch: String,
}

/// What a comment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noteable {
    /// An issue
    Issue,
    /// A merge request
    MergeRequest,
}

impl Noteable {
    /// API path segment
    #[must_use]
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::MergeRequest => "merge_requests",
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::MergeRequest => "merge request",
        }
    }
}

/// Issue, merge request and pipeline operations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IssueTracker: Send + Sync {
    /// Groups visible to the token
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Projects of a group
    async fn list_projects(&self, group_id: i64) -> Result<Vec<Project>>;

    /// Issues of a project
    async fn list_issues(&self, project_id: i64) -> Result<Vec<Issue>>;

    /// Merge requests of a project
    async fn list_merge_requests(&self, project_id: i64) -> Result<Vec<MergeRequest>>;

    /// Open an issue
    async fn create_issue(&self, project_id: i64, title: &str, description: &str)
        -> Result<Issue>;

    /// Replace an issue's labels
    async fn change_issue_label(&self, project_id: i64, issue_iid: i64, label: &str)
        -> Result<Issue>;

    /// Close an issue
    async fn close_issue(&self, project_id: i64, issue_iid: i64) -> Result<Issue>;

    /// Reopen an issue
    async fn reopen_issue(&self, project_id: i64, issue_iid: i64) -> Result<Issue>;

    /// Add a top-level comment
    async fn comment(
        &self,
        project_id: i64,
        target: Noteable,
        iid: i64,
        body: &str,
    ) -> Result<Note>;

    /// Reply in the thread that contains `note_id`
    async fn reply_to_comment(
        &self,
        project_id: i64,
        target: Noteable,
        iid: i64,
        note_id: i64,
        body: &str,
    ) -> Result<Note>;

    /// Open a merge request
    async fn create_merge_request(
        &self,
        project_id: i64,
        draft: &MergeRequestDraft,
    ) -> Result<MergeRequest>;

    /// Start a pipeline on a ref
    async fn run_pipeline(&self, project_id: i64, git_ref: &str) -> Result<Pipeline>;
}
