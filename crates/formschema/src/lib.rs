//! formschema: turn interactive PDF forms into UI-ready JSON field schemas.
//!
//! This is the public API facade. It re-exports the data model from
//! formschema-core and uses formschema-parse for PDF reading.
//!
//! # Architecture
//!
//! - **formschema-core**: data model and pure algorithms (classification,
//!   label matching, section assembly)
//! - **formschema-parse**: lopdf-backed field and text-run extraction
//! - **formschema** (this crate): the enrichment seam, the field processing
//!   controller, and the end-to-end [`SchemaPipeline`]
//!
//! ```no_run
//! use formschema::{HeuristicEnricher, SchemaPipeline};
//!
//! let schema = SchemaPipeline::new(HeuristicEnricher::new()).run("application.pdf")?;
//! println!("{} fields in {} sections", schema.total_fields, schema.sections.len());
//! # Ok::<(), formschema::FormError>(())
//! ```

pub mod controller;
pub mod document;
pub mod enrich;
pub mod error;
pub mod options;
pub mod pipeline;

pub use controller::{
    Action, AttemptOutcome, ControllerState, ProcessingState, RetryPolicy, Sleeper, ThreadSleeper,
    process_fields, transition,
};
pub use document::FormDocument;
pub use enrich::{EnrichError, EnrichmentRequest, FieldEnricher, HeuristicEnricher};
#[cfg(feature = "anthropic")]
pub use enrich::{AnthropicConfig, AnthropicEnricher};
pub use error::FormError;
pub use formschema_core;
pub use formschema_core::{
    BoundingBox, EnrichedField, FieldType, FieldValidation, FormSchema, LabelMatchOptions,
    OutputField, RawField, SchemaMetadata, Section, TextRun,
};
pub use formschema_parse;
pub use options::ProcessingOptions;
pub use pipeline::{DEFAULT_OUTPUT_NAME, SchemaPipeline, default_output_path, schema_to_json, write_schema};
