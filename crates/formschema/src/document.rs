//! Opening form PDFs.

use std::path::Path;

use formschema_core::{RawField, TextRun};
use formschema_parse::ParsedPdf;

use crate::error::FormError;

/// A PDF opened for form extraction.
#[derive(Debug)]
pub struct FormDocument {
    pdf: ParsedPdf,
}

impl FormDocument {
    /// Open a document from raw bytes.
    pub fn open(bytes: &[u8]) -> Result<Self, FormError> {
        Ok(Self {
            pdf: ParsedPdf::open(bytes)?,
        })
    }

    /// Open a document from a file path.
    ///
    /// # Errors
    ///
    /// [`FormError::NotFound`] if the path does not exist, [`FormError::Io`]
    /// if it cannot be read, and [`FormError::Backend`] if it is not a
    /// readable PDF.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FormError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.pdf.page_count()
    }

    /// Every form field in page-then-annotation order.
    pub fn fields(&self) -> Vec<RawField> {
        self.pdf.fields()
    }

    /// Positioned text runs for label matching.
    pub fn text_runs(&self) -> Vec<TextRun> {
        self.pdf.text_runs()
    }

    pub fn parsed(&self) -> &ParsedPdf {
        &self.pdf
    }
}
