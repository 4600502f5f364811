//! formschema-parse: lopdf-backed field and text extraction.
//!
//! Reads widget annotations into [`RawField`](formschema_core::RawField)s,
//! resolving one level of `/Parent` inheritance, and interprets page content
//! streams (including form XObjects) into positioned
//! [`TextRun`](formschema_core::TextRun)s used for label matching, decoding
//! shown strings through each font's encoding or `/ToUnicode` map.
//! Depends on formschema-core for the shared data types.

pub mod decode;
pub mod document;
pub mod error;
pub mod extractor;
pub mod font;
pub mod resolver;
pub mod text_runs;

pub use document::ParsedPdf;
pub use error::BackendError;
pub use extractor::{UNNAMED_FIELD, extract_fields, extract_from_acroform, extract_from_pages};
pub use font::{PdfFont, ToUnicodeMap};
pub use formschema_core;
pub use resolver::{FieldArena, FieldNode, NodeId, resolve, resolve_entry};
pub use text_runs::{extract_text_runs, page_text_runs};
