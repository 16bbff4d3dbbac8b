//! Typed error kinds for the crate.
//!
//! [`DocChatError`] enumerates the spec's failure kinds (plus `Busy` and
//! `Timeout`) using the `thiserror` derive idiom, alongside a crate-wide
//! [`Result`] alias.

use thiserror::Error;

/// All the ways a doc-chat operation can fail.
#[derive(Debug, Error)]
pub enum DocChatError {
    /// A parameter was outside its valid range or otherwise malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The declared media type is not one this tool can handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Text extraction from the uploaded document failed.
    #[error("extraction failure: {0}")]
    ExtractionFailure(String),

    /// A call to the hosted chat model failed.
    #[error("model call failure: {0}")]
    ModelCallFailure(String),

    /// The supplied query was empty or blank.
    #[error("empty query: {0}")]
    EmptyQuery(String),

    /// A model call exceeded the configured timeout (seconds).
    #[error("operation timed out after {0}s")]
    Timeout(u64),

    /// Another operation is already in flight on this session.
    #[error("session busy: {0}")]
    Busy(String),
}

/// Crate-wide result type specialized to [`DocChatError`].
pub type Result<T> = std::result::Result<T, DocChatError>;
