//! Git input validation
//!
//! Everything the planner passes to `git` goes through these checks first, so a
//! branch or path can never be read as a flag or escape the workspace.

const SHELL_CHARS: &[char] = &['`', '$', '|', ';', '&', '>', '<', '\n', '\r', '\0'];

/// Validate a branch name (prevent flag and command injection)
pub fn is_valid_branch_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }

    // A leading dash would be parsed as an option
    if name.starts_with('-') {
        return false;
    }

    if name.chars().any(|c| SHELL_CHARS.contains(&c) || c.is_whitespace()) {
        return false;
    }

    !name.contains("..")
}

/// Validate a remote URL
pub fn is_valid_remote_url(url: &str) -> bool {
    let safe_protocols = ["https://", "git://", "ssh://", "git@"];
    if !safe_protocols.iter().any(|p| url.starts_with(p)) {
        return false;
    }

    if url
        .chars()
        .any(|c| SHELL_CHARS.contains(&c) || c == '\'' || c == '"' || c.is_whitespace())
    {
        return false;
    }

    !url.contains("..")
}

/// Validate a path relative to the workspace or to a repository
pub fn is_valid_relative_path(path: &str) -> bool {
    if path.is_empty() || path.len() > 4096 {
        return false;
    }

    if path.starts_with('/') || path.starts_with('-') {
        return false;
    }

    if path.split(['/', '\\']).any(|part| part == "..") {
        return false;
    }

    !path.chars().any(|c| SHELL_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_branch_names() {
        assert!(is_valid_branch_name("main"));
        assert!(is_valid_branch_name("feature/new-ingress"));
        assert!(is_valid_branch_name("fix-123"));

        assert!(!is_valid_branch_name(""));
        assert!(!is_valid_branch_name("-D"));
        assert!(!is_valid_branch_name("--force"));
        assert!(!is_valid_branch_name("branch;rm -rf /"));
        assert!(!is_valid_branch_name("branch`whoami`"));
        assert!(!is_valid_branch_name("branch$PATH"));
        assert!(!is_valid_branch_name("a..b"));
        assert!(!is_valid_branch_name("two words"));
    }

    #[test]
    fn test_valid_remote_urls() {
        assert!(is_valid_remote_url("https://github.com/jjoneson/langchain.git"));
        assert!(is_valid_remote_url("git@gitlab.com:group/project.git"));
        assert!(is_valid_remote_url("ssh://git@gitlab.com/group/project.git"));

        assert!(!is_valid_remote_url("file:///etc/passwd"));
        assert!(!is_valid_remote_url("--upload-pack=touch /tmp/x"));
        assert!(!is_valid_remote_url("https://host/repo.git;id"));
        assert!(!is_valid_remote_url("https://host/../../repo.git"));
        assert!(!is_valid_remote_url("javascript:alert(1)"));
    }

    #[test]
    fn test_valid_relative_paths() {
        assert!(is_valid_relative_path("jjoneson/langchain"));
        assert!(is_valid_relative_path("charts/app/values.yaml"));
        assert!(is_valid_relative_path(".gitlab-ci.yml"));

        assert!(!is_valid_relative_path(""));
        assert!(!is_valid_relative_path("/etc/passwd"));
        assert!(!is_valid_relative_path("../outside"));
        assert!(!is_valid_relative_path("repo/../../outside"));
        assert!(!is_valid_relative_path("-rf"));
        assert!(!is_valid_relative_path("file$(id)"));
    }
}
