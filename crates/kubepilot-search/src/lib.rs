//! Kubepilot Search - Document Retrieval Index
//!
//! This crate provides the storage half of domain-knowledge retrieval:
//! - `TextSplitter`: recursive character chunking with overlap
//! - `DocumentIndex`: chunk store plus an HNSW cosine index (usearch)
//! - `load_document`: fetch a source document over HTTP or from disk
//!
//! # Architecture
//!
//! ```text
//! source document ──► TextSplitter ──► chunks ──► embeddings ──► DocumentIndex
//!                                                                   │
//!                                                     index.usearch + chunks.json
//! ```
//!
//! Embedding is the caller's job, so the index stays independent of any provider.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chunker;
pub mod error;
pub mod index;
pub mod source;

pub use chunker::TextSplitter;
pub use error::{Error, Result};
pub use index::{DocumentIndex, IndexConfig, SearchHit};
pub use source::load_document;
