//! Opened PDF documents.

use formschema_core::{RawField, TextRun};
use tracing::debug;

use crate::error::BackendError;
use crate::extractor::extract_fields;
use crate::text_runs::extract_text_runs;

/// A parsed PDF held in memory, decrypted when it opens with the empty
/// user password.
///
/// The underlying lopdf document is only read after opening; extraction can
/// be repeated and yields identical results.
#[derive(Debug)]
pub struct ParsedPdf {
    inner: lopdf::Document,
    page_count: usize,
}

impl ParsedPdf {
    /// Parse a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Parse`] for bytes that are not a PDF and
    /// [`BackendError::Encrypted`] for documents that need a password.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        Self::from_document(inner)
    }

    /// Wrap an already-loaded document.
    ///
    /// Encrypted documents are decrypted with the empty user password, which
    /// is how permissions-only forms open; anything else is
    /// [`BackendError::Encrypted`].
    pub fn from_document(mut inner: lopdf::Document) -> Result<Self, BackendError> {
        if inner.is_encrypted() {
            let empty: &str = "";
            inner.decrypt(empty).map_err(|e| {
                debug!("empty-password decryption failed: {e}");
                BackendError::Encrypted
            })?;
        }
        let page_count = inner.get_pages().len();
        Ok(Self { inner, page_count })
    }

    /// Number of pages in the page tree.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Every form field in page-then-annotation order.
    pub fn fields(&self) -> Vec<RawField> {
        extract_fields(&self.inner)
    }

    /// Positioned text runs across all pages.
    pub fn text_runs(&self) -> Vec<TextRun> {
        extract_text_runs(&self.inner)
    }
}
