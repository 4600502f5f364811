//! End-to-end schema generation: open, extract, enrich, group.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use formschema_core::{
    FormSchema, SchemaMetadata, assemble_sections, group_by_page, slugify, title_from_stem,
};
use tracing::{info, warn};

use crate::controller::{Sleeper, ThreadSleeper, process_fields};
use crate::document::FormDocument;
use crate::enrich::FieldEnricher;
use crate::error::FormError;
use crate::options::ProcessingOptions;

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "output.json";

/// Turns a form PDF into a [`FormSchema`].
#[derive(Debug)]
pub struct SchemaPipeline<E, S = ThreadSleeper> {
    enricher: E,
    sleeper: S,
    options: ProcessingOptions,
}

impl<E: FieldEnricher> SchemaPipeline<E> {
    pub fn new(enricher: E) -> Self {
        Self {
            enricher,
            sleeper: ThreadSleeper,
            options: ProcessingOptions::default(),
        }
    }
}

impl<E: FieldEnricher, S: Sleeper> SchemaPipeline<E, S> {
    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the backoff sleeper.
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> SchemaPipeline<E, S2> {
        SchemaPipeline {
            enricher: self.enricher,
            sleeper,
            options: self.options,
        }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Run the whole pipeline on a PDF file.
    ///
    /// `form_id` and `title` derive from the file stem. Only opening the
    /// document can fail; enrichment problems show up in
    /// `metadata.failed_fields`.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<FormSchema, FormError> {
        let path = path.as_ref();
        let doc = FormDocument::open_file(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.build(&doc, &source, &stem))
    }

    /// Build a schema for an already-open document.
    pub fn build(&self, doc: &FormDocument, source_pdf: &str, stem: &str) -> FormSchema {
        let fields = doc.fields();
        let text_runs = if fields.is_empty() {
            Vec::new()
        } else {
            doc.text_runs()
        };
        info!(
            fields = fields.len(),
            text_runs = text_runs.len(),
            pages = doc.page_count(),
            "extracted document content"
        );

        let processed = process_fields(
            &fields,
            &text_runs,
            &self.enricher,
            &self.sleeper,
            &self.options,
        );

        let plans = group_by_page(&processed.enriched);
        let assembled = assemble_sections(&plans, &processed.enriched);
        for (section_id, field_id) in &assembled.missing {
            warn!(section = %section_id, field = %field_id, "section references an unknown field; dropped");
        }
        let total_fields: usize = assembled.sections.iter().map(|s| s.fields.len()).sum();
        info!(
            sections = assembled.sections.len(),
            total_fields, "grouped fields into sections"
        );

        FormSchema {
            form_id: slugify(stem),
            title: title_from_stem(stem),
            total_fields,
            sections: assembled.sections,
            metadata: SchemaMetadata {
                source_pdf: source_pdf.to_string(),
                pages: doc.page_count(),
                extracted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                failed_fields: processed.failed_fields.len(),
            },
        }
    }
}

/// `output.json` in the directory holding `pdf_path`.
pub fn default_output_path(pdf_path: &Path) -> PathBuf {
    pdf_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_NAME)
}

/// Serialize a schema to JSON text.
pub fn schema_to_json(schema: &FormSchema, pretty: bool) -> Result<String, FormError> {
    let json = if pretty {
        serde_json::to_string_pretty(schema)?
    } else {
        serde_json::to_string(schema)?
    };
    Ok(json)
}

/// Write a schema as pretty-printed JSON.
pub fn write_schema(schema: &FormSchema, path: &Path) -> Result<(), FormError> {
    let json = schema_to_json(schema, true)?;
    std::fs::write(path, json + "\n")?;
    info!(path = %path.display(), "wrote schema");
    Ok(())
}
