//! Source document loading

use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetch a text document from an `http(s)://` URL or a local path.
///
/// Binary documents (PDF or anything that is not UTF-8) are rejected.
#[instrument]
pub async fn load_document(location: &str) -> Result<String> {
    let bytes = if location.starts_with("http://") || location.starts_with("https://") {
        fetch(location).await?
    } else {
        tokio::fs::read(Path::new(location)).await?
    };

    if bytes.starts_with(b"%PDF") {
        return Err(Error::Source(format!(
            "{} is a PDF; convert it to text before indexing",
            location
        )));
    }

    let text = String::from_utf8(bytes)
        .map_err(|_| Error::Source(format!("{} is not a UTF-8 text document", location)))?;
    debug!(chars = text.len(), "Loaded document");
    Ok(text)
}

async fn fetch(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| Error::Source(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Source(format!("Failed to fetch {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(Error::Source(format!(
            "Fetching {} returned status {}",
            url,
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Source(format!("Failed to read {}: {}", url, e)))?;
    Ok(body.to_vec())
}
