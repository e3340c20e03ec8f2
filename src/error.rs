//! Error types for the PDF library.
//!
//! There is one error enum for the whole crate. Everything below the
//! cross-reference layer is best-effort: those stages log warnings and
//! continue, so most variants here only surface through the public API
//! (bad header, unrecoverable structure, out-of-range page numbers).

/// Result type alias for PDF library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during PDF processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error from the underlying byte source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid PDF header (expected '%PDF-').
    #[error("not a PDF file: expected '%PDF-' header, found {0:?}")]
    InvalidHeader(String),

    /// The xref table could not be read and the rebuild scan failed,
    /// or the trailer dictionary is missing/unparseable after recovery.
    #[error("structural corruption: {0}")]
    StructuralCorruption(String),

    /// A declared stream filter has no decoder implementation.
    /// Callers log this and keep the raw bytes.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Stream decoding failed (corrupt payload, bad predictor layout, ...).
    #[error("stream decode error: {0}")]
    Decode(String),

    /// Dereference miss: the object is not in the table.
    #[error("object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Public API misuse: page index outside 1..=page_count.
    #[error("page number out of range: {0}")]
    OutOfRange(usize),

    /// `search()` was given a pattern that does not compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_header_message() {
        let err = Error::InvalidHeader("GIF89a".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("%PDF-"));
        assert!(msg.contains("GIF89a"));
    }

    #[test]
    fn test_object_not_found_message() {
        let err = Error::ObjectNotFound(10, 0);
        assert_eq!(format!("{}", err), "object not found: 10 0 R");
    }

    #[test]
    fn test_unsupported_filter_message() {
        let err = Error::UnsupportedFilter("LZWDecode".to_string());
        assert!(format!("{}", err).contains("LZWDecode"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
