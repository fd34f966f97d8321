//! Git - Local working-copy tools
//!
//! Repositories are cloned under one workspace directory, each at a path derived
//! from its remote URL. Every later operation addresses a checkout by that
//! relative path. Branches, paths and URLs are validated before `git` runs, and
//! credentials are scrubbed from every message.

mod client;
mod paths;
pub mod security;
mod tools;


pub use client::{GitCli, GitCredentials, SourceControl, DEFAULT_GIT_USERNAME};
pub use paths::{authenticated_url, local_path_for, strip_credentials};
pub use tools::{GitOperation, GitTool};

use crate::toolkit::Toolkit;
use std::sync::Arc;

/// Every working-copy tool
#[must_use]
pub fn toolkit(client: Arc<dyn SourceControl>) -> Toolkit {
    GitOperation::ALL
        .into_iter()
        .fold(Toolkit::new("git"), |toolkit, operation| {
            toolkit.with_tool(Arc::new(GitTool::new(operation, Arc::clone(&client))))
        })
}
