//! Chunk index backed by usearch
//!
//! Each chunk of the source document is stored alongside its embedding. Keys in the
//! HNSW index are chunk positions, so the chunk text can be recovered directly from a
//! search hit.
//!
//! On disk an index is a directory holding `index.usearch` and `chunks.json`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use usearch::ffi::{IndexOptions, MetricKind, ScalarKind};

const INDEX_FILE: &str = "index.usearch";
const CHUNKS_FILE: &str = "chunks.json";

/// Configuration for the chunk index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector dimensions
    pub dimensions: usize,
    /// Connectivity parameter (higher = more accurate but slower)
    pub connectivity: usize,
    /// Expansion factor for add operations
    pub expansion_add: usize,
    /// Expansion factor for search operations
    pub expansion_search: usize,
}

impl IndexConfig {
    /// Create a new index configuration with default HNSW settings
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            connectivity: 16,
            expansion_add: 128,
            expansion_search: 64,
        }
    }

    fn options(&self) -> IndexOptions {
        IndexOptions {
            dimensions: self.dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: self.connectivity,
            expansion_add: self.expansion_add,
            expansion_search: self.expansion_search,
            multi: false,
        }
    }
}

/// One retrieved chunk
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Position of the chunk in the source document
    pub chunk_id: u64,
    /// Chunk text
    pub text: String,
    /// Cosine similarity (higher = more similar)
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunkStore {
    config: IndexConfig,
    source: Option<String>,
    chunks: Vec<String>,
}

/// Chunk texts plus their embeddings
pub struct DocumentIndex {
    index: usearch::Index,
    chunks: Vec<String>,
    config: IndexConfig,
    source: Option<String>,
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("chunks", &self.chunks.len())
            .field("config", &self.config)
            .field("source", &self.source)
            .finish()
    }
}

impl DocumentIndex {
    /// Create an empty in-memory index
    pub fn new(config: IndexConfig) -> Result<Self> {
        let index = usearch::Index::new(&config.options())
            .map_err(|e| Error::Index(format!("Failed to create index: {}", e)))?;

        info!(
            "Created document index: {} dims, cosine metric",
            config.dimensions
        );

        Ok(Self {
            index,
            chunks: Vec::new(),
            config,
            source: None,
        })
    }

    /// Record where the indexed document came from
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a chunk and its embedding, returning the chunk id
    #[instrument(skip(self, text, vector), fields(vector_len = vector.len()))]
    pub fn add(&mut self, text: impl Into<String>, vector: &[f32]) -> Result<u64> {
        if vector.len() != self.config.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            });
        }

        if self.index.size() >= self.index.capacity() {
            let new_cap = std::cmp::max(self.index.capacity() * 2, 64);
            self.index
                .reserve(new_cap)
                .map_err(|e| Error::Index(format!("Failed to expand capacity: {}", e)))?;
        }

        let key = self.chunks.len() as u64;
        self.index
            .add(key, vector)
            .map_err(|e| Error::Index(format!("Failed to add vector: {}", e)))?;
        self.chunks.push(text.into());

        debug!("Added chunk {}", key);
        Ok(key)
    }

    /// Return the `top_k` chunks closest to `query`, best first
    #[instrument(skip(self, query), fields(top_k = top_k))]
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.config.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimensions,
                actual: query.len(),
            });
        }
        if self.chunks.is_empty() {
            return Err(Error::Empty);
        }

        let matches = self
            .index
            .search(query, top_k)
            .map_err(|e| Error::Index(format!("Search failed: {}", e)))?;

        let hits: Vec<SearchHit> = matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .filter_map(|(key, distance)| {
                let text = self.chunks.get(usize::try_from(*key).ok()?)?;
                Some(SearchHit {
                    chunk_id: *key,
                    text: text.clone(),
                    score: 1.0 - distance,
                })
            })
            .collect();

        debug!("Found {} chunks", hits.len());
        Ok(hits)
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Vector dimensions
    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Source document, if recorded
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Write the index into `dir`, creating it if needed
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let index_path = dir.join(INDEX_FILE);
        let index_path_str = index_path
            .to_str()
            .ok_or_else(|| Error::Index("Invalid path encoding for index".to_string()))?;
        self.index
            .save(index_path_str)
            .map_err(|e| Error::Index(format!("Failed to save index: {}", e)))?;

        let store = ChunkStore {
            config: self.config.clone(),
            source: self.source.clone(),
            chunks: self.chunks.clone(),
        };
        let json = serde_json::to_string_pretty(&store)
            .map_err(|e| Error::Serialization(format!("Failed to serialize chunks: {}", e)))?;
        std::fs::write(dir.join(CHUNKS_FILE), json)?;

        info!(
            "Saved index with {} chunks to {}",
            self.chunks.len(),
            dir.display()
        );
        Ok(())
    }

    /// Load an index previously written by [`DocumentIndex::save`]
    #[instrument(fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(dir.join(CHUNKS_FILE))?;
        let store: ChunkStore = serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("Failed to parse chunks: {}", e)))?;

        let index = usearch::Index::new(&store.config.options())
            .map_err(|e| Error::Index(format!("Failed to create index: {}", e)))?;
        let index_path = dir.join(INDEX_FILE);
        let index_path_str = index_path
            .to_str()
            .ok_or_else(|| Error::Index("Invalid path encoding for index".to_string()))?;
        index
            .load(index_path_str)
            .map_err(|e| Error::Index(format!("Failed to load index: {}", e)))?;

        info!(
            "Loaded index with {} chunks from {}",
            store.chunks.len(),
            dir.display()
        );

        Ok(Self {
            index,
            chunks: store.chunks,
            config: store.config,
            source: store.source,
        })
    }

    /// Whether `dir` contains a saved index
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).exists() && dir.join(CHUNKS_FILE).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_index() -> DocumentIndex {
        let mut index = DocumentIndex::new(IndexConfig::new(4)).unwrap();
        index.add("pods run containers", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        index.add("services expose pods", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        index.add("deployments manage replicasets", &[0.0, 0.0, 1.0, 0.0]).unwrap();
        index
    }

    #[test]
    fn test_add_and_search() {
        let index = create_test_index();
        assert_eq!(index.len(), 3);

        let hits = index.search(&[0.9, 0.1, 0.0, 0.0], 2).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].text, "pods run containers");
        assert_eq!(hits[0].chunk_id, 0);
        assert!(hits[0].score > 0.9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = DocumentIndex::new(IndexConfig::new(4)).unwrap();
        let err = index.add("x", &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_search_empty_index() {
        let index = DocumentIndex::new(IndexConfig::new(4)).unwrap();
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0, 0.0], 1),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let index = create_test_index().with_source("https://example.com/k8s.txt");
        index.save(dir.path()).unwrap();
        assert!(DocumentIndex::exists(dir.path()));

        let loaded = DocumentIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.source(), Some("https://example.com/k8s.txt"));

        let hits = loaded.search(&[0.0, 0.0, 1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].text, "deployments manage replicasets");
    }
}
