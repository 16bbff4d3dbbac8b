//! Embedding provider abstraction and vector similarity.
//!
//! Defines the [`EmbeddingProvider`] trait and the shipped implementation:
//! - **[`HashedBowProvider`]** — a deterministic hashed bag-of-words
//!   embedder. Lowercased alphanumeric tokens are hashed into `dims`
//!   signed buckets and the result is L2-normalized.
//!
//! Determinism is a hard contract: the same input text always yields the
//! same vector, so similarity scores are reproducible across calls and
//! across runs. Retrieval quality is whatever token overlap buys — the
//! provider trait is the seam for swapping in a real embedding model.
//!
//! Also provides [`cosine_similarity`] for scoring vector pairs.

use sha2::{Digest, Sha256};

use crate::error::{DocChatError, Result};

/// Trait for embedding providers.
///
/// Implementations must be deterministic: `embed(s)` returns the same
/// vector for the same `s`, and every vector has exactly `dims()` entries.
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"hashed-bow-v1"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a text string. Never fails; text with no tokens (including
    /// the empty string) returns the zero vector.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic hashed bag-of-words embedder.
///
/// Each token's SHA-256 digest selects a bucket (first 8 bytes, little-
/// endian, mod `dims`) and a sign (low bit of the ninth byte). Token
/// counts accumulate into the signed buckets and the vector is
/// L2-normalized, so cosine scores reflect token overlap independent of
/// document length.
pub struct HashedBowProvider {
    dims: usize,
}

impl HashedBowProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl EmbeddingProvider for HashedBowProvider {
    fn model_name(&self) -> &str {
        "hashed-bow-v1"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        let mut tokens = 0usize;

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let h = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]);
            let bucket = (h % self.dims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return vector;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

/// Lowercased alphanumeric tokens of `text`, in order.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

// ============ Similarity ============

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; higher means more aligned. Vectors of
/// different lengths are not comparable and produce
/// [`DocChatError::InvalidParameter`]. If either vector has zero
/// magnitude the similarity is defined as `0.0` rather than letting a
/// division by zero feed NaN into ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DocChatError::InvalidParameter(format!(
            "vector length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return Ok(0.0);
    }

    Ok(dot / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: usize = 384;

    #[test]
    fn test_embed_is_deterministic() {
        let provider = HashedBowProvider::new(DIMS);
        let a = provider.embed("the quick brown fox");
        let b = provider.embed("the quick brown fox");
        assert_eq!(a, b);
    }

    #[test]
    fn test_embed_has_fixed_dims() {
        let provider = HashedBowProvider::new(DIMS);
        for text in ["", "one", "a longer piece of text with more tokens"] {
            assert_eq!(provider.embed(text).len(), DIMS);
        }
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let provider = HashedBowProvider::new(DIMS);
        for text in ["", "   ", "!!! ---"] {
            assert!(provider.embed(text).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_nonempty_text_is_unit_length() {
        let provider = HashedBowProvider::new(DIMS);
        let v = provider.embed("alpha beta gamma");
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tokenization_ignores_case_and_punctuation() {
        let provider = HashedBowProvider::new(DIMS);
        assert_eq!(provider.embed("Hello, World!"), provider.embed("hello world"));
    }

    #[test]
    fn test_cosine_identical() {
        let provider = HashedBowProvider::new(DIMS);
        let v = provider.embed("some document text");
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let v = vec![1.0, 2.0, 3.0];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &zero).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch_is_invalid() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(DocChatError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_shared_tokens_score_higher() {
        let provider = HashedBowProvider::new(DIMS);
        let query = provider.embed("rust ownership borrowing");
        let related = provider.embed("ownership and borrowing rules in rust");
        let unrelated = provider.embed("recipe for sourdough bread starter");
        let s_related = cosine_similarity(&query, &related).unwrap();
        let s_unrelated = cosine_similarity(&query, &unrelated).unwrap();
        assert!(s_related > s_unrelated);
    }
}
