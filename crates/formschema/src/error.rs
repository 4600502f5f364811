//! Error types for the public API.

use std::path::PathBuf;

use formschema_parse::BackendError;
use thiserror::Error;

/// A fatal error that stops a schema run.
///
/// Enrichment failures never surface here; the processing controller absorbs
/// them as retries, skips, or fallbacks.
#[derive(Debug, Error)]
pub enum FormError {
    /// The PDF could not be opened or parsed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Error reading the input or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing the schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
}
