//! Top-k retrieval over an embedded chunk index.
//!
//! [`ChunkIndex`] pairs each chunk with its embedding vector, computed once
//! at build time. Queries embed only the query text and score it against
//! the cached vectors, so a question costs one embedder call regardless of
//! document size. The index is rebuilt wholesale when a new document is
//! processed, which is the only time the chunk set changes.

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::Result;
use crate::models::{Chunk, ScoredChunk};

/// Chunks plus their cached embedding vectors.
pub struct ChunkIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl ChunkIndex {
    /// Embed every chunk once and store the pairs.
    pub fn build(provider: &dyn EmbeddingProvider, chunks: Vec<Chunk>) -> Self {
        let vectors = chunks.iter().map(|c| provider.embed(&c.text)).collect();
        Self { chunks, vectors }
    }

    /// An index with no chunks (the state before any document is
    /// processed).
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
}

/// Return the `top_k` chunks most similar to `query`, ordered by
/// descending score.
///
/// The result has `min(top_k, index.len())` entries. Equal scores keep the
/// chunks' insertion order (the sort is stable), so retrieval is
/// deterministic for identical input. An empty index or `top_k == 0`
/// yields an empty result, not an error.
pub fn retrieve(
    provider: &dyn EmbeddingProvider,
    index: &ChunkIndex,
    query: &str,
    top_k: usize,
) -> Result<Vec<ScoredChunk>> {
    if index.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    let query_vec = provider.embed(query);

    let mut scored: Vec<ScoredChunk> = Vec::with_capacity(index.len());
    for (chunk, vector) in index.chunks.iter().zip(index.vectors.iter()) {
        let score = cosine_similarity(&query_vec, vector)?;
        scored.push(ScoredChunk {
            chunk: chunk.clone(),
            score,
        });
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);

    Ok(scored)
}
