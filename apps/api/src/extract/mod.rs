//! Text extraction — normalizes an uploaded file into one plain-text string.
//!
//! The per-format decoders are black boxes; this module only dispatches on
//! the declared media type and folds decoder failures into `ExtractError`.
//! The upload handler recovers both error variants to empty text plus a
//! user-visible warning, which forces full manual fallback downstream.

pub mod docx;

use thiserror::Error;

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MEDIA_TYPE_TXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Please upload PDF, DOCX, or TXT files.")]
    UnsupportedFormat(String),

    #[error("Could not read the uploaded file: {0}")]
    Decode(String),
}

/// Decodes uploaded bytes into plain text based on the declared media type.
/// Media-type parameters (e.g. `; charset=utf-8`) are ignored.
pub fn extract_text(media_type: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        MEDIA_TYPE_PDF => extract_pdf(bytes),
        MEDIA_TYPE_DOCX => docx::extract_docx(bytes),
        MEDIA_TYPE_TXT => extract_plain(bytes),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

/// Page text in page order, as emitted by the pdf-extract crate.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Decode(format!("PDF: {e}")))
}

fn extract_plain(bytes: &[u8]) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ExtractError::Decode(format!("text file is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through_verbatim() {
        let text = extract_text(MEDIA_TYPE_TXT, "Jane Doe\njane@doe.dev".as_bytes()).unwrap();
        assert_eq!(text, "Jane Doe\njane@doe.dev");
    }

    #[test]
    fn test_media_type_parameters_are_ignored() {
        let text = extract_text("text/plain; charset=utf-8", b"hello").unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_failure() {
        let err = extract_text(MEDIA_TYPE_TXT, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }

    #[test]
    fn test_unknown_media_type_is_unsupported() {
        let err = extract_text("image/png", b"\x89PNG").unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(t) => assert_eq!(t, "image/png"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_pdf_is_a_decode_failure() {
        let err = extract_text(MEDIA_TYPE_PDF, b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }
}
