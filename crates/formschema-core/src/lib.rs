//! formschema-core: backend-independent data types and algorithms.
//!
//! This crate provides the form data model (bounding boxes, raw and enriched
//! fields, text runs, the output schema) and the pure algorithms that work on
//! it: field classification, spatial label matching, type heuristics and
//! section assembly. It performs no I/O.

pub mod enriched;
pub mod field;
pub mod geometry;
pub mod heuristics;
pub mod label;
pub mod schema;
pub mod text;

pub use enriched::{EnrichedField, FieldValidation};
pub use field::{FF_COMBO, FF_PUSHBUTTON, FF_RADIO, FieldCategory, FieldType, RawField, classify};
pub use geometry::BoundingBox;
pub use heuristics::{heuristic_type, looks_like_date, looks_like_signature};
pub use label::{LabelCandidate, LabelMatchOptions, nearby_labels, rank_label_candidates};
pub use schema::{
    AssembledSections, FormSchema, OutputField, SchemaMetadata, Section, SectionPlan,
    assemble_sections, field_id, group_by_page, page_section_id, slugify, title_from_stem,
};
pub use text::TextRun;
