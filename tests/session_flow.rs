//! Session state-machine tests against the collaborator trait seams.
//!
//! The model collaborator is a scripted mock so the full
//! upload → ask → summarize → reset flow runs without a network.

use async_trait::async_trait;

use doc_chat::config::Config;
use doc_chat::embedding::HashedBowProvider;
use doc_chat::error::{DocChatError, Result};
use doc_chat::extract::DefaultExtractor;
use doc_chat::model::ChatModel;
use doc_chat::models::{ChatMessage, Role, SessionStage};
use doc_chat::session::Session;

/// Replies with a fixed string, or fails every call when `reply` is
/// `None`.
struct MockModel {
    reply: Option<String>,
}

impl MockModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl ChatModel for MockModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _messages: &[ChatMessage], _max_tokens: u32) -> Result<String> {
        match &self.reply {
            Some(r) => Ok(r.clone()),
            None => Err(DocChatError::ModelCallFailure("mock failure".to_string())),
        }
    }
}

fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.chunking.chunk_size = 8;
    cfg.chunking.overlap = 2;
    cfg.embedding.dims = 128;
    cfg
}

fn new_session() -> Session {
    let cfg = test_config();
    let provider = Box::new(HashedBowProvider::new(cfg.embedding.dims));
    Session::new(cfg, provider)
}

const DOC: &str = "The capital of France is Paris. The Seine flows through the city. \
                   Paris hosts the Louvre, the largest art museum in the world.";

async fn ready_session() -> Session {
    let mut session = new_session();
    session
        .upload(DOC.as_bytes(), "text/plain", &DefaultExtractor)
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_upload_reaches_ready() {
    let session = ready_session().await;
    assert_eq!(session.stage(), SessionStage::Ready);
    assert!(session.chunk_count() > 0);
    assert_eq!(session.document(), DOC);
    assert!(session.transcript().is_empty());
    assert!(session.summary().is_none());
}

#[tokio::test]
async fn test_ask_appends_user_then_assistant() {
    let mut session = ready_session().await;
    let model = MockModel::replying("Paris.");

    let answer = session.ask("What is the capital?", &model).await.unwrap();
    assert_eq!(answer, "Paris.");
    assert_eq!(session.stage(), SessionStage::Ready);

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[0].content, "What is the capital?");
    assert_eq!(transcript[1].role, Role::Assistant);
    assert_eq!(transcript[1].content, "Paris.");
}

#[tokio::test]
async fn test_ask_blank_question_is_empty_query() {
    let mut session = ready_session().await;
    let model = MockModel::replying("unused");

    let err = session.ask("   ", &model).await.unwrap_err();
    assert!(matches!(err, DocChatError::EmptyQuery(_)));
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_ask_before_upload_is_empty_query() {
    let mut session = new_session();
    let model = MockModel::replying("unused");

    let err = session.ask("anything", &model).await.unwrap_err();
    assert!(matches!(err, DocChatError::EmptyQuery(_)));
    assert_eq!(session.stage(), SessionStage::Empty);
}

#[tokio::test]
async fn test_model_failure_leaves_transcript_unchanged() {
    let mut session = ready_session().await;

    let err = session
        .ask("What is the capital?", &MockModel::failing())
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::ModelCallFailure(_)));
    assert!(session.transcript().is_empty());
    assert_eq!(session.stage(), SessionStage::Ready);

    // The session is retryable after the failure.
    let answer = session
        .ask("What is the capital?", &MockModel::replying("Paris."))
        .await
        .unwrap();
    assert_eq!(answer, "Paris.");
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn test_unsupported_upload_leaves_session_empty() {
    let mut session = new_session();

    let err = session
        .upload(b"PK\x03\x04", "application/zip", &DefaultExtractor)
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::UnsupportedFormat(_)));
    assert_eq!(session.stage(), SessionStage::Empty);
    assert_eq!(session.chunk_count(), 0);
}

#[tokio::test]
async fn test_image_upload_without_ocr_fails_and_stays_empty() {
    let mut session = new_session();

    let err = session
        .upload(b"\x89PNG\r\n", "image/png", &DefaultExtractor)
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    assert_eq!(session.stage(), SessionStage::Empty);
}

#[tokio::test]
async fn test_empty_extraction_is_a_failure() {
    let mut session = new_session();

    let err = session
        .upload(b"   \n ", "text/plain", &DefaultExtractor)
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    assert_eq!(session.stage(), SessionStage::Empty);
}

#[tokio::test]
async fn test_new_upload_clears_prior_state() {
    let mut session = ready_session().await;
    session
        .ask("question?", &MockModel::replying("answer"))
        .await
        .unwrap();
    session
        .summarize(&MockModel::replying("a summary"))
        .await
        .unwrap();
    assert_eq!(session.transcript().len(), 2);
    assert!(session.summary().is_some());

    let second = "Entirely different document about rust programming.";
    session
        .upload(second.as_bytes(), "text/plain", &DefaultExtractor)
        .await
        .unwrap();

    assert_eq!(session.stage(), SessionStage::Ready);
    assert_eq!(session.document(), second);
    assert!(session.transcript().is_empty());
    assert!(session.summary().is_none());
}

#[tokio::test]
async fn test_failed_reupload_leaves_session_empty() {
    let mut session = ready_session().await;

    // The new upload clears the old document before extraction, so a
    // failure lands in Empty rather than keeping stale chunks.
    let err = session
        .upload(b"\xff\xfe", "text/plain", &DefaultExtractor)
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    assert_eq!(session.stage(), SessionStage::Empty);
    assert_eq!(session.chunk_count(), 0);
    assert!(session.document().is_empty());
}

#[tokio::test]
async fn test_summarize_stores_summary() {
    let mut session = ready_session().await;

    let summary = session
        .summarize(&MockModel::replying("a short summary"))
        .await
        .unwrap();
    assert_eq!(summary, "a short summary");
    assert_eq!(session.summary(), Some("a short summary"));
}

#[tokio::test]
async fn test_summarize_failure_keeps_previous_summary() {
    let mut session = ready_session().await;
    session
        .summarize(&MockModel::replying("first summary"))
        .await
        .unwrap();

    let err = session.summarize(&MockModel::failing()).await.unwrap_err();
    assert!(matches!(err, DocChatError::ModelCallFailure(_)));
    assert_eq!(session.summary(), Some("first summary"));
    assert_eq!(session.stage(), SessionStage::Ready);
}

#[tokio::test]
async fn test_summarize_before_upload_fails() {
    let mut session = new_session();
    let err = session
        .summarize(&MockModel::replying("unused"))
        .await
        .unwrap_err();
    assert!(matches!(err, DocChatError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_reset_returns_to_empty() {
    let mut session = ready_session().await;
    session
        .ask("question?", &MockModel::replying("answer"))
        .await
        .unwrap();

    session.reset();
    assert_eq!(session.stage(), SessionStage::Empty);
    assert_eq!(session.chunk_count(), 0);
    assert!(session.document().is_empty());
    assert!(session.transcript().is_empty());
    assert!(session.summary().is_none());
}

#[tokio::test]
async fn test_retrieve_context_prefers_matching_chunk() {
    let mut session = new_session();
    // Two clearly separated topics, one per chunk (chunk_size 8, overlap 2).
    let doc = "apples oranges pears plums grapes melons cherries figs \
               carburetor pistons crankshaft camshaft gearbox clutch flywheel axle";
    session
        .upload(doc.as_bytes(), "text/plain", &DefaultExtractor)
        .await
        .unwrap();

    let hits = session.retrieve_context("pistons crankshaft gearbox").unwrap();
    assert!(!hits.is_empty());
    assert!(hits[0].chunk.text.contains("pistons"));
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
