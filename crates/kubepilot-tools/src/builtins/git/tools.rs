//! Working-copy tools

use super::client::SourceControl;
use crate::args::{ArgSchema, ParsedArgs};
use crate::error::Result;
use crate::registry::{RiskLevel, Tool, ToolCategory, ToolDefinition};
use std::sync::Arc;

/// Which working-copy operation a [`GitTool`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOperation {
    /// Clone a remote
    Clone,
    /// Create and switch to a branch
    CreateBranch,
    /// Switch to a branch
    CheckoutBranch,
    /// Pull the current branch
    Pull,
    /// Push the current branch
    Push,
    /// Stage a file
    AddFile,
    /// Commit everything
    Commit,
    /// Read a file
    GetFileContent,
    /// Write a file
    WriteFile,
}

impl GitOperation {
    /// Every operation, in prompt order
    pub const ALL: [GitOperation; 9] = [
        Self::Clone,
        Self::CreateBranch,
        Self::CheckoutBranch,
        Self::Pull,
        Self::Push,
        Self::AddFile,
        Self::Commit,
        Self::GetFileContent,
        Self::WriteFile,
    ];

    fn definition(self) -> ToolDefinition {
        let repo = ("repository", "the local repository path");
        let (name, description, args, risk) = match self {
            Self::Clone => (
                "git_repository_clone",
                "Can be used to clone a git repository, i.e. https://github.com/jjoneson/k8s-explorer.git \
                 Returns a string containing the local path to the repository.",
                ArgSchema::none().name("url", "an https url to the repository"),
                RiskLevel::Medium,
            ),
            Self::CreateBranch => (
                "git_repository_create_branch",
                "Can be used to create a git branch. \
                 Returns a string containing the name of the branch that was created.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .name("branch", "the name of the branch to create"),
                RiskLevel::Medium,
            ),
            Self::CheckoutBranch => (
                "git_repository_checkout_branch",
                "Can be used to checkout a git branch. \
                 Returns a string containing the name of the branch that was checked out.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .name("branch", "the name of the branch to checkout"),
                RiskLevel::Medium,
            ),
            Self::Pull => (
                "git_repository_pull",
                "Can be used to pull from a git repository. \
                 Returns a string containing the result of the pull.",
                ArgSchema::none().name(repo.0, repo.1),
                RiskLevel::Medium,
            ),
            Self::Push => (
                "git_repository_push",
                "Can be used to push to a git repository. \
                 Returns a string containing the result of the push.",
                ArgSchema::none().name(repo.0, repo.1),
                RiskLevel::High,
            ),
            Self::AddFile => (
                "git_repository_add_file",
                "Can be used to stage a file to a git repository's index so it can be committed. \
                 Returns a string containing the result of the add.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .name("file", "the path to the file to add"),
                RiskLevel::Medium,
            ),
            Self::Commit => (
                "git_repository_commit",
                "Can be used to commit changes to a git repository. \
                 Returns a string containing the result of the commit.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .text("message", "the commit message"),
                RiskLevel::Medium,
            ),
            Self::GetFileContent => (
                "git_repository_get_file_content",
                "Can be used to get the content of a file in a git repository. \
                 Returns a string containing the content of the file.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .name("file", "the path to the file"),
                RiskLevel::Low,
            ),
            Self::WriteFile => (
                "git_repository_write_file",
                "Can be used to write the content of a file to a git repository. \
                 Returns a string containing the result of the write.",
                ArgSchema::none()
                    .name(repo.0, repo.1)
                    .name("file", "the path to the file")
                    .text("content", "the content of the file"),
                RiskLevel::Medium,
            ),
        };
        ToolDefinition::new(name, description)
            .with_args(args)
            .with_risk_level(risk)
            .with_category(ToolCategory::Git)
    }
}

/// One working-copy operation exposed as a tool
pub struct GitTool {
    operation: GitOperation,
    definition: ToolDefinition,
    client: Arc<dyn SourceControl>,
}

impl GitTool {
    /// Create the tool for `operation`
    #[must_use]
    pub fn new(operation: GitOperation, client: Arc<dyn SourceControl>) -> Self {
        Self {
            operation,
            definition: operation.definition(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for GitTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let client = self.client.as_ref();
        match self.operation {
            GitOperation::Clone => {
                let path = client.clone_repository(args.str("url")?).await?;
                Ok(format!("Repository cloned to {}", path))
            }
            GitOperation::CreateBranch => {
                let branch = args.str("branch")?;
                client.create_branch(args.str("repository")?, branch).await?;
                Ok(format!("Branch {} created successfully", branch))
            }
            GitOperation::CheckoutBranch => {
                let branch = args.str("branch")?;
                client
                    .checkout_branch(args.str("repository")?, branch)
                    .await?;
                Ok(format!("Checked out branch {} successfully", branch))
            }
            GitOperation::Pull => {
                let remote = client.pull(args.str("repository")?).await?;
                Ok(format!("Pulled from {} successfully", remote))
            }
            GitOperation::Push => {
                let remote = client.push(args.str("repository")?).await?;
                Ok(format!("Pushed to {} successfully", remote))
            }
            GitOperation::AddFile => {
                let file = args.str("file")?;
                client.add_file(args.str("repository")?, file).await?;
                Ok(format!("Added file {} successfully", file))
            }
            GitOperation::Commit => {
                let message = args.str("message")?;
                client.commit(args.str("repository")?, message).await?;
                Ok(format!("Commit {} created successfully", message))
            }
            GitOperation::GetFileContent => {
                client
                    .read_file(args.str("repository")?, args.str("file")?)
                    .await
            }
            GitOperation::WriteFile => {
                let file = args.str("file")?;
                client
                    .write_file(args.str("repository")?, file, args.str("content")?)
                    .await?;
                Ok(format!("File {} written successfully", file))
            }
        }
    }
}
