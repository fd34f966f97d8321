//! Source-control client: the `SourceControl` trait and a `git` CLI implementation

use super::paths::{authenticated_url, local_path_for, redact, strip_credentials};
use super::security::{is_valid_branch_name, is_valid_relative_path, is_valid_remote_url};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Default user for https remotes
pub const DEFAULT_GIT_USERNAME: &str = "k8s-engineer";

/// Working-copy operations
///
/// `repo` is always a checkout path relative to the workspace, as returned by
/// [`SourceControl::clone_repository`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SourceControl: Send + Sync {
    /// Clone a remote, returning the local checkout path
    async fn clone_repository(&self, url: &str) -> Result<String>;

    /// Create a branch from HEAD and switch to it
    async fn create_branch(&self, repo: &str, branch: &str) -> Result<()>;

    /// Switch to an existing branch
    async fn checkout_branch(&self, repo: &str, branch: &str) -> Result<()>;

    /// Pull the current branch, returning the remote URL
    async fn pull(&self, repo: &str) -> Result<String>;

    /// Push the current branch, returning the remote URL
    async fn push(&self, repo: &str) -> Result<String>;

    /// Stage one file
    async fn add_file(&self, repo: &str, file: &str) -> Result<()>;

    /// Stage everything and commit
    async fn commit(&self, repo: &str, message: &str) -> Result<()>;

    /// Read a file from the working tree
    async fn read_file(&self, repo: &str, file: &str) -> Result<String>;

    /// Write a file into the working tree
    async fn write_file(&self, repo: &str, file: &str, content: &str) -> Result<()>;
}

/// Credentials for https remotes
#[derive(Clone)]
pub struct GitCredentials {
    /// User name
    pub username: String,
    /// Password or access token
    pub password: String,
}

impl std::fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl GitCredentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `GIT_USERNAME` (default `k8s-engineer`) and `GIT_PASSWORD`; `None` without a password
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let password = std::env::var("GIT_PASSWORD").ok().filter(|p| !p.is_empty())?;
        let username =
            std::env::var("GIT_USERNAME").unwrap_or_else(|_| DEFAULT_GIT_USERNAME.to_string());
        Some(Self::new(username, password))
    }
}

/// [`SourceControl`] backed by the `git` binary
#[derive(Debug, Clone)]
pub struct GitCli {
    workspace: PathBuf,
    credentials: Option<GitCredentials>,
}

impl GitCli {
    /// Create a client rooted at `workspace`
    #[must_use]
    pub fn new(workspace: impl Into<PathBuf>, credentials: Option<GitCredentials>) -> Self {
        Self {
            workspace: workspace.into(),
            credentials,
        }
    }

    /// Workspace directory holding every checkout
    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    fn author(&self) -> &str {
        self.credentials
            .as_ref()
            .map(|c| c.username.as_str())
            .unwrap_or(DEFAULT_GIT_USERNAME)
    }

    fn redact(&self, text: &str) -> String {
        redact(
            text,
            self.credentials.as_ref().map(|c| c.password.as_str()),
        )
    }

    fn checkout_dir(&self, repo: &str) -> Result<PathBuf> {
        if !is_valid_relative_path(repo) {
            return Err(Error::InvalidInput(format!(
                "invalid repository path '{}'",
                repo
            )));
        }
        Ok(self.workspace.join(repo))
    }

    fn file_path(&self, repo: &str, file: &str) -> Result<PathBuf> {
        if !is_valid_relative_path(file) {
            return Err(Error::InvalidInput(format!("invalid file path '{}'", file)));
        }
        Ok(self.checkout_dir(repo)?.join(file))
    }

    fn check_branch(branch: &str) -> Result<()> {
        if is_valid_branch_name(branch) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "invalid branch name '{}'",
                branch
            )))
        }
    }

    /// Run `git` in `dir`, returning stdout; stderr is redacted into the error
    async fn git(&self, dir: &Path, args: &[&str]) -> Result<String> {
        debug!(dir = %dir.display(), command = %args.first().copied().unwrap_or_default(), "Running git");

        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Upstream(format!("failed to run git: {}", e)))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Upstream(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            self.redact(stderr.trim())
        )))
    }

    async fn remote_url(&self, dir: &Path) -> Result<String> {
        let url = self.git(dir, &["remote", "get-url", "origin"]).await?;
        Ok(strip_credentials(&url))
    }
}

#[async_trait::async_trait]
impl SourceControl for GitCli {
    #[instrument(skip(self))]
    async fn clone_repository(&self, url: &str) -> Result<String> {
        if !is_valid_remote_url(url) {
            return Err(Error::InvalidInput(
                "invalid or unsafe repository URL: only https://, git://, ssh:// and git@ remotes are allowed"
                    .to_string(),
            ));
        }
        let local = local_path_for(url)?;
        let target = self.workspace.join(&local);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let remote = match &self.credentials {
            Some(c) => authenticated_url(url, &c.username, &c.password),
            None => url.to_string(),
        };
        let target_arg = target.to_string_lossy();
        self.git(&self.workspace, &["clone", "--", &remote, &target_arg])
            .await?;

        info!(path = %local, "Repository cloned");
        Ok(local)
    }

    async fn create_branch(&self, repo: &str, branch: &str) -> Result<()> {
        Self::check_branch(branch)?;
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["checkout", "-b", branch]).await?;
        Ok(())
    }

    async fn checkout_branch(&self, repo: &str, branch: &str) -> Result<()> {
        Self::check_branch(branch)?;
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["checkout", branch, "--"]).await?;
        Ok(())
    }

    async fn pull(&self, repo: &str) -> Result<String> {
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["pull", "--ff-only"]).await?;
        self.remote_url(&dir).await
    }

    async fn push(&self, repo: &str) -> Result<String> {
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["push", "--set-upstream", "origin", "HEAD"])
            .await?;
        self.remote_url(&dir).await
    }

    async fn add_file(&self, repo: &str, file: &str) -> Result<()> {
        self.file_path(repo, file)?;
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["add", "--", file]).await?;
        Ok(())
    }

    async fn commit(&self, repo: &str, message: &str) -> Result<()> {
        let dir = self.checkout_dir(repo)?;
        self.git(&dir, &["add", "--all"]).await?;

        let name = format!("user.name={}", self.author());
        let email = format!("user.email={}@users.noreply.local", self.author());
        self.git(
            &dir,
            &["-c", &name, "-c", &email, "commit", "--message", message],
        )
        .await?;
        Ok(())
    }

    async fn read_file(&self, repo: &str, file: &str) -> Result<String> {
        let path = self.file_path(repo, file)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Upstream(format!("failed to read {}: {}", file, e)))
    }

    async fn write_file(&self, repo: &str, file: &str, content: &str) -> Result<()> {
        let path = self.file_path(repo, file)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| Error::Upstream(format!("failed to write {}: {}", file, e)))
    }
}
