//! Output schema types and section assembly.
//!
//! Fields are grouped into one [`Section`] per source page. The grouping
//! step produces [`SectionPlan`]s that reference fields by `field_id`;
//! [`assemble_sections`] resolves those references, sorts, and reports any
//! id it could not find instead of failing.

use std::collections::{BTreeMap, HashMap};

use crate::{EnrichedField, FieldType, FieldValidation, RawField};

/// Synthetic, zero-padded field id for a 1-based order, e.g. `field_001`.
pub fn field_id(order: usize) -> String {
    format!("field_{order:03}")
}

/// Section id for a page-grouped section, e.g. `page_2`.
pub fn page_section_id(page: usize) -> String {
    format!("page_{page}")
}

/// A field as written to the schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputField {
    pub field_id: String,
    pub pdf_field_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: FieldType,
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub placeholder: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub help_text: Option<String>,
    pub required: bool,
    pub page: usize,
    /// 1-based position in extraction order.
    pub order: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub group: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub options: Option<Vec<String>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub validation: Option<FieldValidation>,
}

impl OutputField {
    /// Combine a raw field with its enrichment.
    ///
    /// `index` is the 0-based extraction index. The enrichment's type
    /// override wins over `heuristic_type`, and its group wins over the
    /// field's radio group.
    pub fn from_enriched(
        raw: &RawField,
        index: usize,
        heuristic_type: FieldType,
        enriched: EnrichedField,
    ) -> Self {
        let order = index + 1;
        Self {
            field_id: field_id(order),
            pdf_field_name: raw.name.clone(),
            field_type: enriched.type_override.unwrap_or(heuristic_type),
            label: enriched.label,
            placeholder: enriched.placeholder,
            help_text: enriched.help_text,
            required: enriched.required,
            page: raw.page,
            order,
            group: enriched.group.or_else(|| raw.radio_group.clone()),
            options: (!raw.options.is_empty()).then(|| raw.options.clone()),
            validation: enriched.validation.filter(|v| !v.is_empty()),
        }
    }
}

/// An ordered bucket of fields sharing a grouping key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    pub section_id: String,
    pub title: String,
    pub order: usize,
    pub fields: Vec<OutputField>,
}

/// Run-level facts recorded alongside the schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaMetadata {
    pub source_pdf: String,
    pub pages: usize,
    /// RFC 3339 UTC timestamp.
    pub extracted_at: String,
    /// Number of fields that were skipped or fell back.
    pub failed_fields: usize,
}

/// The top-level schema consumed by a form-rendering UI.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormSchema {
    pub form_id: String,
    pub title: String,
    pub total_fields: usize,
    pub sections: Vec<Section>,
    pub metadata: SchemaMetadata,
}

/// A section before its field references are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlan {
    pub section_id: String,
    pub title: String,
    pub order: usize,
    pub field_ids: Vec<String>,
}

/// Group fields by source page, one plan per distinct page, in page order.
pub fn group_by_page(fields: &[OutputField]) -> Vec<SectionPlan> {
    let mut pages: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for field in fields {
        pages.entry(field.page).or_default().push(field.field_id.clone());
    }
    pages
        .into_iter()
        .map(|(page, field_ids)| SectionPlan {
            section_id: page_section_id(page),
            title: format!("Page {page}"),
            order: page,
            field_ids,
        })
        .collect()
}

/// Sections plus any field ids the plans referenced but no field carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledSections {
    pub sections: Vec<Section>,
    /// `(section_id, field_id)` pairs that were dropped.
    pub missing: Vec<(String, String)>,
}

/// Resolve plans against the processed fields.
///
/// Fields inside a section are sorted by `(page, order)`; sections by
/// `order`. Both sorts are stable.
pub fn assemble_sections(plans: &[SectionPlan], fields: &[OutputField]) -> AssembledSections {
    let by_id: HashMap<&str, &OutputField> =
        fields.iter().map(|f| (f.field_id.as_str(), f)).collect();

    let mut assembled = AssembledSections::default();
    for plan in plans {
        let mut section_fields = Vec::with_capacity(plan.field_ids.len());
        for id in &plan.field_ids {
            match by_id.get(id.as_str()) {
                Some(field) => section_fields.push((*field).clone()),
                None => assembled
                    .missing
                    .push((plan.section_id.clone(), id.clone())),
            }
        }
        section_fields.sort_by_key(|f| (f.page, f.order));
        assembled.sections.push(Section {
            section_id: plan.section_id.clone(),
            title: plan.title.clone(),
            order: plan.order,
            fields: section_fields,
        });
    }
    assembled.sections.sort_by_key(|s| s.order);
    assembled
}

/// Lowercase slug: runs of non-alphanumerics become `_`, trimmed at the ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Human title from a file stem: `_` and `-` become spaces, words capitalized.
pub fn title_from_stem(stem: &str) -> String {
    stem.replace(['_', '-'], " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
