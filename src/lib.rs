//! # Doc Chat
//!
//! A session-scoped document question-answering tool with deterministic
//! retrieval.
//!
//! Doc Chat turns one document into an embedded chunk index and answers
//! questions about it: text is extracted, split into overlapping word
//! windows, embedded with a deterministic hashed bag-of-words provider,
//! and ranked against each question by cosine similarity. The top matches
//! plus the question go to a hosted language model for the final answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────┐   ┌─────────────┐
//! │ Extract  │──▶│ Chunk + Embed      │──▶│ ChunkIndex   │
//! │ txt/pdf  │   │ (word windows)    │   │ (in-memory) │
//! └──────────┘   └───────────────────┘   └──────┬──────┘
//!                                               │ cosine top-k
//!                     ┌─────────────────────────┤
//!                     ▼                         ▼
//!                ┌──────────┐            ┌──────────────┐
//!                │ Session  │───────────▶│ Chat model   │
//!                │ (docchat)│  context   │ (Messages)   │
//!                └──────────┘            └──────────────┘
//! ```
//!
//! Everything is in-memory and scoped to one session; a new upload or a
//! reset replaces the whole state.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Typed failure kinds |
//! | [`extract`] | Media-type dispatch text extraction |
//! | [`chunk`] | Overlapping word-window chunking |
//! | [`embedding`] | Deterministic embedding provider + cosine similarity |
//! | [`retrieve`] | Cached chunk index and top-k retrieval |
//! | [`model`] | Chat-model collaborator (Messages API) |
//! | [`session`] | Session state machine (upload/ask/summarize/reset) |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod model;
pub mod models;
pub mod retrieve;
pub mod session;
