//! Text extraction for uploaded documents.
//!
//! The upload surface accepts three declared media types: plain text, PDF,
//! and images. Extraction itself is a collaborator behind the
//! [`TextExtractor`] trait; its output is treated as opaque input text with
//! no assumptions about fidelity.
//!
//! [`DefaultExtractor`] decodes plain text as UTF-8 and parses PDFs with
//! `pdf-extract`. Image OCR is not part of the default build — an `image/*`
//! upload is accepted by the surface but fails extraction until an OCR
//! collaborator is plugged in.

use async_trait::async_trait;

use crate::error::{DocChatError, Result};

/// Declared media types the upload surface accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    PlainText,
    Pdf,
    Image,
}

impl MediaType {
    /// Parse a declared media type string.
    ///
    /// `text/plain`, `application/pdf`, and any `image/*` subtype are
    /// accepted; everything else is [`DocChatError::UnsupportedFormat`].
    pub fn parse(declared: &str) -> Result<Self> {
        match declared {
            "text/plain" => Ok(Self::PlainText),
            "application/pdf" => Ok(Self::Pdf),
            t if t.starts_with("image/") => Ok(Self::Image),
            other => Err(DocChatError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Infer a declared media type from a file extension.
    ///
    /// Returns `None` for extensions outside the accepted set; callers
    /// should then require an explicit declared type.
    pub fn infer_from_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "md" => Some("text/plain"),
            "pdf" => Some("application/pdf"),
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            _ => None,
        }
    }
}

/// Collaborator that turns raw file bytes into UTF-8 text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8], media: MediaType) -> Result<String>;
}

/// Built-in extractor: UTF-8 for plain text, `pdf-extract` for PDFs,
/// no OCR for images.
pub struct DefaultExtractor;

#[async_trait]
impl TextExtractor for DefaultExtractor {
    async fn extract(&self, bytes: &[u8], media: MediaType) -> Result<String> {
        match media {
            MediaType::PlainText => String::from_utf8(bytes.to_vec())
                .map_err(|e| DocChatError::ExtractionFailure(format!("invalid UTF-8: {e}"))),
            MediaType::Pdf => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| DocChatError::ExtractionFailure(format!("PDF parsing failed: {e}"))),
            MediaType::Image => Err(DocChatError::ExtractionFailure(
                "image uploads require an OCR collaborator, none is configured".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_media_types() {
        assert_eq!(MediaType::parse("text/plain").unwrap(), MediaType::PlainText);
        assert_eq!(MediaType::parse("application/pdf").unwrap(), MediaType::Pdf);
        assert_eq!(MediaType::parse("image/png").unwrap(), MediaType::Image);
        assert_eq!(MediaType::parse("image/jpeg").unwrap(), MediaType::Image);
    }

    #[test]
    fn test_unsupported_media_type_rejected() {
        for declared in ["application/zip", "text/html", "video/mp4", ""] {
            assert!(matches!(
                MediaType::parse(declared),
                Err(DocChatError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_infer_from_extension() {
        assert_eq!(MediaType::infer_from_extension("txt"), Some("text/plain"));
        assert_eq!(MediaType::infer_from_extension("PDF"), Some("application/pdf"));
        assert_eq!(MediaType::infer_from_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(MediaType::infer_from_extension("zip"), None);
    }

    #[tokio::test]
    async fn test_plain_text_roundtrip() {
        let text = DefaultExtractor
            .extract("hello document".as_bytes(), MediaType::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "hello document");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_extraction_failure() {
        let err = DefaultExtractor
            .extract(&[0xff, 0xfe, 0xfd], MediaType::PlainText)
            .await
            .unwrap_err();
        assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_extraction_failure() {
        let err = DefaultExtractor
            .extract(b"not a pdf", MediaType::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    }

    #[tokio::test]
    async fn test_image_without_ocr_is_extraction_failure() {
        let err = DefaultExtractor
            .extract(b"\x89PNG", MediaType::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, DocChatError::ExtractionFailure(_)));
    }
}
