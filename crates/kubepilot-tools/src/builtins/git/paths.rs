//! Remote URL handling: local checkout paths and credential injection

use super::security::is_valid_relative_path;
use crate::error::{Error, Result};

/// Replacement for secrets in anything shown to the planner or logged
pub const REDACTED: &str = "***";

/// Local checkout path for a remote: everything after the host, without `.git`
///
/// `https://github.com/jjoneson/langchain.git` maps to `jjoneson/langchain`, and so does
/// `git@github.com:jjoneson/langchain.git`.
pub fn local_path_for(url: &str) -> Result<String> {
    let after_host = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').map(|(_, path)| path)
    } else if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':').map(|(_, path)| path)
    } else {
        None
    };

    let path = after_host
        .map(|p| p.trim_matches('/'))
        .map(|p| p.strip_suffix(".git").unwrap_or(p))
        .unwrap_or_default();

    if !is_valid_relative_path(path) {
        return Err(Error::InvalidInput(format!(
            "cannot derive a local path from '{}'",
            strip_credentials(url)
        )));
    }
    Ok(path.to_string())
}

/// Insert `user:password@` into an https URL
///
/// Other schemes, and URLs that already carry user info, are returned unchanged.
#[must_use]
pub fn authenticated_url(url: &str, username: &str, password: &str) -> String {
    let Some(rest) = url.strip_prefix("https://") else {
        return url.to_string();
    };
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.contains('@') {
        return url.to_string();
    }
    format!(
        "https://{}:{}@{}",
        urlencoding::encode(username),
        urlencoding::encode(password),
        rest
    )
}

/// Remove user info from a URL
#[must_use]
pub fn strip_credentials(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://{}", scheme, &rest[at + 1..]),
        None => url.to_string(),
    }
}

/// Replace every occurrence of a secret, raw or URL-encoded
#[must_use]
pub fn redact(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => {
            let encoded = urlencoding::encode(secret);
            text.replace(encoded.as_ref(), REDACTED)
                .replace(secret, REDACTED)
        }
        _ => text.to_string(),
    }
}
