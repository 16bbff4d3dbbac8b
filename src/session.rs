//! Session state machine.
//!
//! A [`Session`] owns one user flow: the current document's text, the
//! embedded chunk index, the chat transcript, and an optional summary. It
//! moves through `Empty → Processing → Ready`, re-enters `Processing` on a
//! new upload, and resets to `Empty` from any stage.
//!
//! Session-mutating operations are mutually exclusive: a busy gate rejects
//! any operation started while another is in flight. Failures leave the
//! session in its last good stage with the gate released, so the caller
//! can retry.

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocChatError, Result};
use crate::extract::{MediaType, TextExtractor};
use crate::model::{answer_prompt, summary_prompt, ChatModel};
use crate::models::{ChatMessage, ScoredChunk, SessionStage};
use crate::retrieve::{retrieve, ChunkIndex};

/// One user's document-chat session. In-memory only; nothing survives the
/// process.
pub struct Session {
    config: Config,
    provider: Box<dyn EmbeddingProvider>,
    stage: SessionStage,
    busy: bool,
    document: String,
    index: ChunkIndex,
    transcript: Vec<ChatMessage>,
    summary: Option<String>,
}

impl Session {
    /// Create an empty session.
    pub fn new(config: Config, provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            provider,
            stage: SessionStage::Empty,
            busy: false,
            document: String::new(),
            index: ChunkIndex::empty(),
            transcript: Vec::new(),
            summary: None,
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    /// Extracted text of the current document. Empty until an upload
    /// completes.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// The current document's chunks, in insertion order.
    pub fn chunks(&self) -> &[crate::models::Chunk] {
        self.index.chunks()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Process a new document: extract text, chunk it, and embed the
    /// chunks. Returns the chunk count.
    ///
    /// Any previous document, transcript, and summary are cleared before
    /// extraction starts, so a failed upload leaves the session `Empty`.
    pub async fn upload(
        &mut self,
        bytes: &[u8],
        declared_type: &str,
        extractor: &dyn TextExtractor,
    ) -> Result<usize> {
        let media = MediaType::parse(declared_type)?;
        self.acquire()?;

        self.clear_content();
        self.stage = SessionStage::Processing;

        let result = self.process_document(bytes, media, extractor).await;
        self.busy = false;

        match result {
            Ok(count) => {
                self.stage = SessionStage::Ready;
                tracing::info!(chunks = count, "document processed");
                Ok(count)
            }
            Err(e) => {
                self.stage = SessionStage::Empty;
                tracing::warn!(error = %e, "upload failed");
                Err(e)
            }
        }
    }

    async fn process_document(
        &mut self,
        bytes: &[u8],
        media: MediaType,
        extractor: &dyn TextExtractor,
    ) -> Result<usize> {
        let text = extractor.extract(bytes, media).await?;
        if text.trim().is_empty() {
            return Err(DocChatError::ExtractionFailure(
                "extraction returned no text".to_string(),
            ));
        }

        let chunks = chunk_text(
            &text,
            self.config.chunking.chunk_size,
            self.config.chunking.overlap,
        )?;
        self.index = ChunkIndex::build(self.provider.as_ref(), chunks);
        self.document = text;
        Ok(self.index.len())
    }

    /// Answer a question about the current document.
    ///
    /// Retrieves the top-k chunks as context and asks the model. On
    /// success the user question and the model's answer are appended to
    /// the transcript, in that order; on failure the transcript is
    /// unchanged and the session stays `Ready`.
    pub async fn ask(&mut self, question: &str, model: &dyn ChatModel) -> Result<String> {
        if self.stage != SessionStage::Ready || self.index.is_empty() {
            return Err(DocChatError::EmptyQuery(
                "no document has been processed".to_string(),
            ));
        }
        if question.trim().is_empty() {
            return Err(DocChatError::EmptyQuery("question is blank".to_string()));
        }
        self.acquire()?;

        let result = self.answer(question, model).await;
        self.busy = false;

        let answer = result?;
        self.transcript.push(ChatMessage::user(question));
        self.transcript.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }

    async fn answer(&self, question: &str, model: &dyn ChatModel) -> Result<String> {
        let hits = self.retrieve_context(question)?;
        let context = hits
            .iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        tracing::debug!(hits = hits.len(), "retrieved context for question");

        let prompt = answer_prompt(&context, question);
        model
            .complete(&[ChatMessage::user(prompt)], self.config.model.answer_max_tokens)
            .await
    }

    /// Rank the current document's chunks against `query` without calling
    /// the model.
    pub fn retrieve_context(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        retrieve(
            self.provider.as_ref(),
            &self.index,
            query,
            self.config.retrieval.top_k,
        )
    }

    /// Summarize the current document (truncated to the configured input
    /// bound). The summary is stored on the session and returned.
    pub async fn summarize(&mut self, model: &dyn ChatModel) -> Result<String> {
        if self.stage != SessionStage::Ready {
            return Err(DocChatError::InvalidParameter(
                "no document to summarize".to_string(),
            ));
        }
        self.acquire()?;

        let prompt = summary_prompt(&self.document, self.config.model.summary_input_chars);
        let result = model
            .complete(
                &[ChatMessage::user(prompt)],
                self.config.model.summary_max_tokens,
            )
            .await;
        self.busy = false;

        let summary = result?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Return the session to `Empty` from any stage, releasing the busy
    /// gate.
    pub fn reset(&mut self) {
        self.clear_content();
        self.stage = SessionStage::Empty;
        self.busy = false;
    }

    fn clear_content(&mut self) {
        self.document.clear();
        self.index = ChunkIndex::empty();
        self.transcript.clear();
        self.summary = None;
    }

    fn acquire(&mut self) -> Result<()> {
        if self.busy {
            return Err(DocChatError::Busy(
                "another operation is in flight".to_string(),
            ));
        }
        self.busy = true;
        Ok(())
    }
}
