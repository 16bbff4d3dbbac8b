//! Core data models used throughout doc-chat.
//!
//! These types represent the chunks, scores, and chat messages that flow
//! through the retrieval pipeline and the session.

use serde::{Deserialize, Serialize};

/// A bounded, possibly overlapping window of a document's word sequence.
///
/// Chunks are immutable once created; the chunk list is replaced wholesale
/// whenever a new document is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Stable 0-based position in the chunk list, in insertion order.
    pub id: usize,
    /// The window's text. Non-empty after trimming.
    pub text: String,
    /// Offset of the window's first word in the source word sequence.
    pub start_word: usize,
}

/// A chunk paired with its similarity to a query.
///
/// Transient; produced during retrieval and discarded after the context
/// string is assembled.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity of the chunk's embedding to the query's, in
    /// `[-1.0, 1.0]`. Higher is more relevant.
    pub score: f32,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the session transcript.
///
/// Serializes to the `{ "role": ..., "content": ... }` shape the model
/// collaborator's wire format expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Lifecycle stage of a [`Session`](crate::session::Session).
///
/// `Empty → Processing → Ready`, with `Ready` re-entering `Processing` on a
/// new upload and any stage resettable to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    /// No document, no chunks, no chat, no summary.
    Empty,
    /// An upload is in flight; conflicting operations are rejected.
    Processing,
    /// Chunks exist; ask and summarize are available.
    Ready,
}
