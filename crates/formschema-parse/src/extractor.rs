//! AcroForm field extraction.
//!
//! The primary walk visits every page's `/Annots` in document order and
//! keeps widget annotations that carry (or inherit from their `/Parent`) a
//! field type. Only when that walk finds nothing does the extractor fall
//! back to the catalog's `/AcroForm /Fields` tree, where page provenance is
//! unavailable and every field is assigned to page 1.
//!
//! Malformed individual annotations are skipped; nothing here fails.

use std::collections::HashSet;

use formschema_core::{FieldCategory, FieldType, RawField, classify};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info};

use crate::resolver::{FieldArena, NodeId, resolve_entry};

/// Name used when neither the field nor its parent carries `/T`.
pub const UNNAMED_FIELD: &str = "unnamed";

/// Limit for `/Kids` recursion in the `/AcroForm` fallback walk.
const MAX_FIELD_DEPTH: usize = 64;

/// Extract every form field in page-then-annotation order.
pub fn extract_fields(doc: &Document) -> Vec<RawField> {
    let fields = extract_from_pages(doc);
    if !fields.is_empty() {
        info!(count = fields.len(), "extracted form fields from page annotations");
        return fields;
    }

    let fields = extract_from_acroform(doc);
    if !fields.is_empty() {
        info!(
            count = fields.len(),
            "no widget annotations carried form data; used the AcroForm field tree"
        );
    }
    fields
}

/// Walk each page's `/Annots`, producing fields tagged with 1-indexed pages.
pub fn extract_from_pages(doc: &Document) -> Vec<RawField> {
    let mut arena = FieldArena::new(doc);
    let mut fields = Vec::new();

    // get_pages is keyed by 1-based page number in document order
    for (page_number, page_id) in doc.get_pages() {
        let page = page_number as usize;
        for node in page_widgets(&mut arena, page_id) {
            if let Some(field) = widget_to_field(&arena, node, page) {
                fields.push(field);
            }
        }
    }
    fields
}

/// Load the annotation nodes listed on one page.
fn page_widgets(arena: &mut FieldArena<'_>, page_id: ObjectId) -> Vec<NodeId> {
    let doc = arena.document();
    let Some(page_dict) = doc.get_object(page_id).ok().and_then(|o| o.as_dict().ok()) else {
        debug!(?page_id, "page object is not a dictionary");
        return Vec::new();
    };
    let Some(annots) = resolve_entry(doc, page_dict, b"Annots").and_then(|o| o.as_array().ok())
    else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(annots.len());
    for entry in annots {
        let node = match entry {
            Object::Reference(id) => arena.insert_widget(*id),
            Object::Dictionary(dict) => Some(arena.insert_inline(dict)),
            _ => None,
        };
        match node {
            Some(node) => nodes.push(node),
            None => debug!(?page_id, "skipping unresolvable annotation entry"),
        }
    }
    nodes
}

/// Turn one annotation node into a field, or `None` if it is not a form widget.
fn widget_to_field(arena: &FieldArena<'_>, node: NodeId, page: usize) -> Option<RawField> {
    let widget = arena.node(node);
    if widget.subtype.as_deref().is_some_and(|s| s != "Widget") {
        return None;
    }
    if !arena.has_field_type(node) {
        debug!(page, "skipping widget without a field type");
        return None;
    }

    let flags = arena.flags(node);
    let field_type = classify(arena.category(node), flags);
    let parent_name = arena.parent_name(node);
    let name = widget
        .name
        .clone()
        .or_else(|| parent_name.clone())
        .unwrap_or_else(|| UNNAMED_FIELD.to_string());
    let options = if field_type.has_options() {
        arena.options(node)
    } else {
        Vec::new()
    };
    let radio_group = (field_type == FieldType::Radio).then(|| parent_name.unwrap_or(name.clone()));

    Some(RawField {
        name,
        field_type,
        page,
        bbox: widget.rect,
        default_value: widget.value.clone(),
        options,
        radio_group,
        flags,
    })
}

/// Attributes inherited down the `/Fields` tree.
#[derive(Debug, Clone, Default)]
struct Inherited {
    name: Option<String>,
    field_type: Option<String>,
    flags: Option<u32>,
    options: Option<Vec<String>>,
}

/// Walk `/AcroForm /Fields`, assigning every terminal field to page 1.
pub fn extract_from_acroform(doc: &Document) -> Vec<RawField> {
    let Some(fields) = acroform_fields(doc) else {
        return Vec::new();
    };

    let mut arena = FieldArena::new(doc);
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    for entry in fields {
        if let Object::Reference(id) = entry {
            walk_field_tree(
                &mut arena,
                *id,
                &Inherited::default(),
                0,
                &mut visited,
                &mut out,
            );
        }
    }
    out
}

fn acroform_fields(doc: &Document) -> Option<&Vec<Object>> {
    let catalog = resolve_entry(doc, &doc.trailer, b"Root")?.as_dict().ok()?;
    let acroform = resolve_entry(doc, catalog, b"AcroForm")?.as_dict().ok()?;
    resolve_entry(doc, acroform, b"Fields")?.as_array().ok()
}

fn walk_field_tree(
    arena: &mut FieldArena<'_>,
    id: ObjectId,
    inherited: &Inherited,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<RawField>,
) {
    if depth >= MAX_FIELD_DEPTH || !visited.insert(id) {
        return;
    }
    let Some(node_id) = arena.load(id) else {
        return;
    };
    let node = arena.node(node_id).clone();

    let full_name = match (&inherited.name, &node.name) {
        (Some(parent), Some(own)) => Some(format!("{parent}.{own}")),
        (Some(parent), None) => Some(parent.clone()),
        (None, own) => own.clone(),
    };
    let here = Inherited {
        name: full_name,
        field_type: node.field_type.clone().or_else(|| inherited.field_type.clone()),
        flags: node.flags.or(inherited.flags),
        options: node.options.clone().or_else(|| inherited.options.clone()),
    };

    // Kids carrying /T are child fields; kids without it are widgets of this field.
    let child_fields: Vec<ObjectId> = node
        .kids
        .iter()
        .copied()
        .filter(|kid| {
            arena
                .load(*kid)
                .is_some_and(|k| arena.node(k).name.is_some())
        })
        .collect();
    if !child_fields.is_empty() {
        for kid in child_fields {
            walk_field_tree(arena, kid, &here, depth + 1, visited, out);
        }
        return;
    }

    if here.field_type.is_none() {
        return;
    }
    let rect = node.rect.or_else(|| {
        node.kids
            .iter()
            .find_map(|kid| arena.load(*kid).and_then(|k| arena.node(k).rect))
    });

    let flags = here.flags.unwrap_or(0);
    let category = here.field_type.as_deref().and_then(FieldCategory::from_pdf_name);
    let field_type = classify(category, flags);
    let name = here.name.unwrap_or_else(|| UNNAMED_FIELD.to_string());
    let options = if field_type.has_options() {
        here.options.unwrap_or_default()
    } else {
        Vec::new()
    };
    let radio_group = (field_type == FieldType::Radio)
        .then(|| inherited.name.clone().unwrap_or_else(|| name.clone()));

    out.push(RawField {
        name,
        field_type,
        page: 1,
        bbox: rect,
        default_value: node.value.clone(),
        options,
        radio_group,
        flags,
    });
}
