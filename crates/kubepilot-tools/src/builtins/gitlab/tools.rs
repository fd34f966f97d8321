//! Issue-tracker tools

use super::client::{IssueTracker, MergeRequestDraft, Noteable};
use crate::args::{ArgSchema, ParsedArgs};
use crate::error::Result;
use crate::registry::{RiskLevel, Tool, ToolCategory, ToolDefinition};
use std::sync::Arc;

/// Which issue-tracker operation a [`GitLabTool`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitLabOperation {
    /// List groups
    ListGroups,
    /// List projects of a group
    ListProjects,
    /// List issues of a project
    ListIssues,
    /// Open an issue
    CreateIssue,
    /// Replace issue labels
    ChangeIssueLabel,
    /// Close an issue
    CloseIssue,
    /// Reopen an issue
    ReopenIssue,
    /// Comment on an issue
    CommentOnIssue,
    /// Reply to an issue comment
    ReplyToIssueComment,
    /// List merge requests of a project
    ListMergeRequests,
    /// Open a merge request
    CreateMergeRequest,
    /// Comment on a merge request
    CommentOnMergeRequest,
    /// Reply to a merge request comment
    ReplyToMergeRequestComment,
    /// Start a pipeline
    RunPipeline,
}

const PROJECT: (&str, &str) = ("project_id", "a gitlab project id");
const ISSUE: (&str, &str) = ("issue_id", "an issue id");
const MERGE_REQUEST: (&str, &str) = ("merge_request_id", "a merge request id");
const COMMENT: (&str, &str) = ("comment_id", "a comment id");

impl GitLabOperation {
    /// Every operation, in prompt order
    pub const ALL: [GitLabOperation; 14] = [
        Self::ListGroups,
        Self::ListProjects,
        Self::ListIssues,
        Self::CreateIssue,
        Self::ChangeIssueLabel,
        Self::CloseIssue,
        Self::ReopenIssue,
        Self::CommentOnIssue,
        Self::ReplyToIssueComment,
        Self::ListMergeRequests,
        Self::CreateMergeRequest,
        Self::CommentOnMergeRequest,
        Self::ReplyToMergeRequestComment,
        Self::RunPipeline,
    ];

    fn definition(self) -> ToolDefinition {
        let project = || ArgSchema::none().integer(PROJECT.0, PROJECT.1);
        let issue = || project().integer(ISSUE.0, ISSUE.1);
        let merge_request = || project().integer(MERGE_REQUEST.0, MERGE_REQUEST.1);

        let (name, description, args, risk) = match self {
            Self::ListGroups => (
                "gitlab_list_groups",
                "Can be used to list all groups in a gitlab instance. \
                 Returns a list of group names.",
                ArgSchema::none(),
                RiskLevel::Low,
            ),
            Self::ListProjects => (
                "gitlab_list_projects",
                "You should know the group id before using this tool. \
                 Can be used to list all projects in a gitlab group. \
                 Returns a list of project names.",
                ArgSchema::none().integer("group_id", "a gitlab group id"),
                RiskLevel::Low,
            ),
            Self::ListIssues => (
                "gitlab_list_issues",
                "You should know the project id before using this tool. \
                 Can be used to list all issues in a gitlab project. \
                 Returns a list of issue titles.",
                project(),
                RiskLevel::Low,
            ),
            Self::CreateIssue => (
                "gitlab_create_issue",
                "You should know the project id before using this tool. \
                 Can be used to create an issue in a gitlab project. \
                 Returns the title of the created issue.",
                project()
                    .text("title", "the issue title")
                    .text("description", "the issue description"),
                RiskLevel::Medium,
            ),
            Self::ChangeIssueLabel => (
                "gitlab_change_issue_label",
                "You should know the project id and issue id before using this tool. \
                 Can be used to change the label of an issue in a gitlab project. \
                 Returns a list of issue labels.",
                issue().text("label", "the new label"),
                RiskLevel::Medium,
            ),
            Self::CloseIssue => (
                "gitlab_close_issue",
                "You should know the project id and issue id before using this tool. \
                 Can be used to close an issue in a gitlab project. \
                 Returns the new state of the issue.",
                issue(),
                RiskLevel::Medium,
            ),
            Self::ReopenIssue => (
                "gitlab_reopen_issue",
                "You should know the project id and issue id before using this tool. \
                 Can be used to reopen a closed issue in a gitlab project. \
                 Returns the new state of the issue.",
                issue(),
                RiskLevel::Medium,
            ),
            Self::CommentOnIssue => (
                "gitlab_comment_on_issue",
                "You should know the project id and issue id before using this tool. \
                 Can be used to comment on an issue in a gitlab project. \
                 Returns the comment.",
                issue().text("comment", "the comment"),
                RiskLevel::Medium,
            ),
            Self::ReplyToIssueComment => (
                "gitlab_reply_to_issue_comment",
                "You should know the project id, issue id, and comment id before using this tool. \
                 Can be used to reply to a comment on an issue in a gitlab project. \
                 Returns the reply.",
                issue()
                    .integer(COMMENT.0, COMMENT.1)
                    .text("reply", "the reply"),
                RiskLevel::Medium,
            ),
            Self::ListMergeRequests => (
                "gitlab_list_merge_requests",
                "You should know the project id before using this tool. \
                 Can be used to list all merge requests in a gitlab project. \
                 Returns a list of merge request titles.",
                project(),
                RiskLevel::Low,
            ),
            Self::CreateMergeRequest => (
                "gitlab_create_merge_request",
                "You should know the project id before using this tool. \
                 Can be used to create a merge request in a gitlab project. \
                 Returns the title of the created merge request.",
                project()
                    .text("title", "the title")
                    .text("description", "the description")
                    .name("source_branch", "the source branch")
                    .name("target_branch", "the target branch"),
                RiskLevel::High,
            ),
            Self::CommentOnMergeRequest => (
                "gitlab_comment_on_merge_request",
                "You should know the project id and merge request id before using this tool. \
                 Can be used to comment on a merge request in a gitlab project. \
                 Returns the comment.",
                merge_request().text("comment", "the comment"),
                RiskLevel::Medium,
            ),
            Self::ReplyToMergeRequestComment => (
                "gitlab_reply_to_merge_request_comment",
                "You should know the project id, merge request id, and comment id before using this tool. \
                 Can be used to reply to a comment on a merge request in a gitlab project. \
                 Returns the reply.",
                merge_request()
                    .integer(COMMENT.0, COMMENT.1)
                    .text("reply", "the reply"),
                RiskLevel::Medium,
            ),
            Self::RunPipeline => (
                "gitlab_run_pipeline",
                "You should know the project id and the branch or tag before using this tool. \
                 Can be used to start a CI pipeline in a gitlab project. \
                 Returns the status of the pipeline.",
                project().name("ref", "the branch or tag to run the pipeline on"),
                RiskLevel::High,
            ),
        };
        ToolDefinition::new(name, description)
            .with_args(args)
            .with_risk_level(risk)
            .with_category(ToolCategory::IssueTracker)
    }
}

fn joined<I: IntoIterator<Item = String>>(items: I, empty: String) -> String {
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        empty
    } else {
        items.join(",")
    }
}

/// One issue-tracker operation exposed as a tool
pub struct GitLabTool {
    operation: GitLabOperation,
    definition: ToolDefinition,
    client: Arc<dyn IssueTracker>,
}

impl GitLabTool {
    /// Create the tool for `operation`
    #[must_use]
    pub fn new(operation: GitLabOperation, client: Arc<dyn IssueTracker>) -> Self {
        Self {
            operation,
            definition: operation.definition(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for GitLabTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        use GitLabOperation as Op;

        let client = self.client.as_ref();
        let output = match self.operation {
            Op::ListGroups => {
                let groups = client.list_groups().await?;
                joined(
                    groups.into_iter().map(|g| g.name),
                    "No groups found".to_string(),
                )
            }
            Op::ListProjects => {
                let group_id = args.int("group_id")?;
                let projects = client.list_projects(group_id).await?;
                joined(
                    projects.into_iter().map(|p| p.name),
                    format!("No projects found in group {}", group_id),
                )
            }
            Op::ListIssues => {
                let project_id = args.int(PROJECT.0)?;
                let issues = client.list_issues(project_id).await?;
                joined(
                    issues.into_iter().map(|i| i.title),
                    format!("No issues found in project {}", project_id),
                )
            }
            Op::ListMergeRequests => {
                let project_id = args.int(PROJECT.0)?;
                let merge_requests = client.list_merge_requests(project_id).await?;
                joined(
                    merge_requests.into_iter().map(|m| m.title),
                    format!("No merge requests found in project {}", project_id),
                )
            }
            Op::CreateIssue => {
                client
                    .create_issue(
                        args.int(PROJECT.0)?,
                        args.str("title")?,
                        args.str("description")?,
                    )
                    .await?
                    .title
            }
            Op::ChangeIssueLabel => {
                let issue = client
                    .change_issue_label(args.int(PROJECT.0)?, args.int(ISSUE.0)?, args.str("label")?)
                    .await?;
                issue.labels.join(",")
            }
            Op::CloseIssue => {
                client
                    .close_issue(args.int(PROJECT.0)?, args.int(ISSUE.0)?)
                    .await?
                    .state
            }
            Op::ReopenIssue => {
                client
                    .reopen_issue(args.int(PROJECT.0)?, args.int(ISSUE.0)?)
                    .await?
                    .state
            }
            Op::CommentOnIssue => {
                client
                    .comment(
                        args.int(PROJECT.0)?,
                        Noteable::Issue,
                        args.int(ISSUE.0)?,
                        args.str("comment")?,
                    )
                    .await?
                    .body
            }
            Op::ReplyToIssueComment => {
                client
                    .reply_to_comment(
                        args.int(PROJECT.0)?,
                        Noteable::Issue,
                        args.int(ISSUE.0)?,
                        args.int(COMMENT.0)?,
                        args.str("reply")?,
                    )
                    .await?
                    .body
            }
            Op::CreateMergeRequest => {
                let draft = MergeRequestDraft {
                    title: args.str("title")?.to_string(),
                    description: args.str("description")?.to_string(),
                    source_branch: args.str("source_branch")?.to_string(),
                    target_branch: args.str("target_branch")?.to_string(),
                };
                client
                    .create_merge_request(args.int(PROJECT.0)?, &draft)
                    .await?
                    .title
            }
            Op::CommentOnMergeRequest => {
                client
                    .comment(
                        args.int(PROJECT.0)?,
                        Noteable::MergeRequest,
                        args.int(MERGE_REQUEST.0)?,
                        args.str("comment")?,
                    )
                    .await?
                    .body
            }
            Op::ReplyToMergeRequestComment => {
                client
                    .reply_to_comment(
                        args.int(PROJECT.0)?,
                        Noteable::MergeRequest,
                        args.int(MERGE_REQUEST.0)?,
                        args.int(COMMENT.0)?,
                        args.str("reply")?,
                    )
                    .await?
                    .body
            }
            Op::RunPipeline => {
                client
                    .run_pipeline(args.int(PROJECT.0)?, args.str("ref")?)
                    .await?
                    .status
            }
        };
        Ok(output)
    }
}
