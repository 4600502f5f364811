//! Error types for the lopdf parsing layer.

use thiserror::Error;

/// Fatal error opening or reading a PDF.
///
/// Malformed individual annotations never produce a `BackendError`; the
/// extractors skip them and keep walking.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The bytes could not be parsed as a PDF document.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is encrypted and does not open with the empty password.
    #[error("PDF is encrypted and requires a password")]
    Encrypted,
}
