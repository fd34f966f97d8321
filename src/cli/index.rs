//! `kubepilot index`: rebuild the documentation index

use crate::server::{config::AppConfig, embedder};
use anyhow::{bail, Context, Result};
use kubepilot_search::{load_document, TextSplitter};
use kubepilot_tools::builtins::RetrievalQa;
use tracing::info;

/// Fetch the document, embed its chunks and save the index
pub async fn run(config: &AppConfig, url: Option<String>) -> Result<()> {
    let Some(url) = url.or_else(|| config.knowledge.doc_url()) else {
        bail!("No document to index: pass --url, set knowledge.doc_url or K8S_DOC_URL");
    };

    info!(url = %url, "Fetching document");
    let text = load_document(&url)
        .await
        .with_context(|| format!("Failed to load {}", url))?;

    let splitter = TextSplitter::new(config.knowledge.chunk_size, config.knowledge.chunk_overlap);
    let embedder = embedder(config)?;
    let index = RetrievalQa::build_index(&embedder, &text, &splitter, &url)
        .await
        .context("Failed to build the index")?;

    let dir = &config.knowledge.index_dir;
    index
        .save(dir)
        .with_context(|| format!("Failed to save the index to {}", dir.display()))?;

    println!("Indexed {} chunks from {} into {}", index.len(), url, dir.display());
    Ok(())
}
