//! Knowledge - Retrieval-augmented answers from reference documentation
//!
//! [`RetrievalQa`] embeds the question, pulls the closest chunks from a
//! [`DocumentIndex`] and asks the model to answer from that context alone.
//! [`RetrievalQa::build_index`] produces the index from a source document.

use crate::args::{ArgSchema, ParsedArgs};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition};
use kubepilot_llm::{CompletionRequest, Message, SharedEmbeddingProvider, SharedLlmProvider};
use kubepilot_search::{DocumentIndex, IndexConfig, TextSplitter};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 4;

const EMBED_BATCH: usize = 64;

const QA_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the users question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n";

/// Answers questions from a document corpus
#[async_trait::async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Answer one question
    async fn answer(&self, question: &str) -> Result<String>;
}

/// Retrieve-then-answer over a [`DocumentIndex`]
pub struct RetrievalQa {
    embedder: SharedEmbeddingProvider,
    llm: SharedLlmProvider,
    index: DocumentIndex,
    model: String,
    top_k: usize,
    max_tokens: u32,
}

impl std::fmt::Debug for RetrievalQa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalQa")
            .field("embedder", &self.embedder.model())
            .field("llm", &self.llm.name())
            .field("index", &self.index)
            .field("model", &self.model)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl RetrievalQa {
    /// Answer from `index`, using the provider's default model
    #[must_use]
    pub fn new(
        embedder: SharedEmbeddingProvider,
        llm: SharedLlmProvider,
        index: DocumentIndex,
    ) -> Self {
        let model = llm.default_model().to_string();
        Self {
            embedder,
            llm,
            index,
            model,
            top_k: DEFAULT_TOP_K,
            max_tokens: 1024,
        }
    }

    /// Set the completion model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set how many chunks are retrieved
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Set the answer length limit
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The index being queried
    #[must_use]
    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// Split `text`, embed every chunk and load it into a fresh index
    #[instrument(skip(embedder, text, splitter), fields(bytes = text.len()))]
    pub async fn build_index(
        embedder: &SharedEmbeddingProvider,
        text: &str,
        splitter: &TextSplitter,
        source: &str,
    ) -> Result<DocumentIndex> {
        let chunks = splitter.split(text);
        if chunks.is_empty() {
            return Err(Error::InvalidInput(format!("{} has no text to index", source)));
        }

        let mut index =
            DocumentIndex::new(IndexConfig::new(embedder.dimensions()))?.with_source(source);
        for batch in chunks.chunks(EMBED_BATCH) {
            let vectors = embedder.embed_batch(batch).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Upstream(format!(
                    "embedding provider returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.iter().zip(&vectors) {
                index.add(chunk.clone(), vector)?;
            }
            debug!(indexed = index.len(), total = chunks.len(), "Embedded batch");
        }

        info!(chunks = index.len(), source = %source, "Built document index");
        Ok(index)
    }
}

#[async_trait::async_trait]
impl KnowledgeBase for RetrievalQa {
    #[instrument(skip(self, question))]
    async fn answer(&self, question: &str) -> Result<String> {
        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, self.top_k)?;
        debug!(hits = hits.len(), "Retrieved context");

        let context = hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = CompletionRequest::new(&self.model)
            .with_message(Message::system(format!("{}{}", QA_SYSTEM_PROMPT, context)))
            .with_message(Message::user(question))
            .with_temperature(0.0)
            .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;
        Ok(response.content.trim().to_string())
    }
}

/// `k8s_sme`: ask the Kubernetes documentation
pub struct KnowledgeTool {
    definition: ToolDefinition,
    knowledge: Arc<dyn KnowledgeBase>,
}

impl KnowledgeTool {
    /// Create the tool
    #[must_use]
    pub fn new(knowledge: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "k8s_sme",
                "Tool for retrieving answers from the Kubernetes Subject Matter Expert.",
            )
            .with_args(ArgSchema::none().text("question", "a string"))
            .with_category(ToolCategory::Knowledge),
            knowledge,
        }
    }
}

#[async_trait::async_trait]
impl Tool for KnowledgeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let question = super::slack::unescape_newlines(args.str("question")?);
        self.knowledge.answer(&question).await
    }
}
