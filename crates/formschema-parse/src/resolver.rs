//! Indirect-reference resolution and one-hop field inheritance.
//!
//! Field dictionaries are loaded into a [`FieldArena`] of plain nodes keyed
//! by object id. A widget node links to its immediate `/Parent` node and
//! nothing further: the parent's own `/Parent` is never followed, so a
//! malformed document whose parent points back at its child cannot recurse.
//! The shared lopdf objects are only read, never mutated.

use std::collections::HashMap;

use formschema_core::{BoundingBox, FieldCategory};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::decode::{decode_pdf_string, name_to_string, object_to_f64, object_to_text};

/// Maximum reference-to-reference hops followed by [`resolve`].
const MAX_REFERENCE_HOPS: usize = 8;

/// Follow indirect references to the concrete object.
///
/// Returns `None` for dangling references and reference chains longer than
/// a few hops; callers treat that as an absent attribute.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Resolve a dictionary entry, treating unresolvable values as absent.
pub fn resolve_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    resolve(doc, dict.get(key).ok()?)
}

/// Index of a node in a [`FieldArena`].
pub type NodeId = usize;

/// The form-relevant attributes of one field or widget dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldNode {
    /// Object id, `None` for dictionaries stored inline in `/Annots`.
    pub object_id: Option<ObjectId>,
    /// Partial name from `/T`.
    pub name: Option<String>,
    /// Raw `/FT` name, kept even when unrecognized.
    pub field_type: Option<String>,
    /// `/Ff` bits.
    pub flags: Option<u32>,
    /// Display strings from `/Opt`.
    pub options: Option<Vec<String>>,
    /// `/V` rendered as text.
    pub value: Option<String>,
    /// `/Rect`.
    pub rect: Option<BoundingBox>,
    /// Annotation `/Subtype` name.
    pub subtype: Option<String>,
    /// Object id named by `/Parent`.
    pub parent_ref: Option<ObjectId>,
    /// Immediate parent node once linked.
    pub parent: Option<NodeId>,
    /// `/Kids` object ids.
    pub kids: Vec<ObjectId>,
}

/// Arena of field nodes with explicit one-hop inheritance lookups.
#[derive(Debug)]
pub struct FieldArena<'a> {
    doc: &'a Document,
    nodes: Vec<FieldNode>,
    by_object: HashMap<ObjectId, NodeId>,
}

impl<'a> FieldArena<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            nodes: Vec::new(),
            by_object: HashMap::new(),
        }
    }

    /// The underlying document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Load an indirect field dictionary and link its immediate parent.
    ///
    /// Returns `None` when the id does not resolve to a dictionary.
    pub fn insert_widget(&mut self, id: ObjectId) -> Option<NodeId> {
        let node = self.load(id)?;
        self.link_parent(node);
        Some(node)
    }

    /// Load a dictionary stored inline in `/Annots` and link its parent.
    pub fn insert_inline(&mut self, dict: &Dictionary) -> NodeId {
        let node = self.push(None, dict);
        self.link_parent(node);
        node
    }

    /// Load an indirect dictionary without linking its parent.
    ///
    /// Loading the same id twice returns the cached node.
    pub fn load(&mut self, id: ObjectId) -> Option<NodeId> {
        if let Some(&node) = self.by_object.get(&id) {
            return Some(node);
        }
        let doc = self.doc;
        let dict = resolve(doc, doc.get_object(id).ok()?)?.as_dict().ok()?;
        let node = self.push(Some(id), dict);
        self.by_object.insert(id, node);
        Some(node)
    }

    fn push(&mut self, object_id: Option<ObjectId>, dict: &Dictionary) -> NodeId {
        let node = read_node(self.doc, object_id, dict);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn link_parent(&mut self, node: NodeId) {
        if self.nodes[node].parent.is_some() {
            return;
        }
        let Some(parent_id) = self.nodes[node].parent_ref else {
            return;
        };
        if let Some(parent) = self.load(parent_id) {
            self.nodes[node].parent = Some(parent);
        }
    }

    pub fn node(&self, id: NodeId) -> &FieldNode {
        &self.nodes[id]
    }

    /// The immediate parent node, if linked.
    pub fn parent(&self, id: NodeId) -> Option<&FieldNode> {
        self.nodes[id].parent.map(|p| &self.nodes[p])
    }

    /// Own attribute, else the immediate parent's.
    fn inherited<T>(&self, id: NodeId, get: impl Fn(&FieldNode) -> Option<T>) -> Option<T> {
        get(&self.nodes[id]).or_else(|| self.parent(id).and_then(&get))
    }

    /// Raw `/FT` name, own or inherited.
    pub fn field_type_name(&self, id: NodeId) -> Option<String> {
        self.inherited(id, |n| n.field_type.clone())
    }

    /// Whether the node or its parent carries any `/FT` at all.
    pub fn has_field_type(&self, id: NodeId) -> bool {
        self.inherited(id, |n| n.field_type.as_ref().map(|_| ())).is_some()
    }

    /// Recognized field category, own or inherited.
    pub fn category(&self, id: NodeId) -> Option<FieldCategory> {
        self.field_type_name(id)
            .as_deref()
            .and_then(FieldCategory::from_pdf_name)
    }

    /// `/Ff` bits, own or inherited, defaulting to 0.
    pub fn flags(&self, id: NodeId) -> u32 {
        self.inherited(id, |n| n.flags).unwrap_or(0)
    }

    /// `/Opt` display strings, own or inherited.
    pub fn options(&self, id: NodeId) -> Vec<String> {
        self.inherited(id, |n| n.options.clone()).unwrap_or_default()
    }

    /// The parent's `/T`.
    pub fn parent_name(&self, id: NodeId) -> Option<String> {
        self.parent(id).and_then(|p| p.name.clone())
    }
}

fn read_node(doc: &Document, object_id: Option<ObjectId>, dict: &Dictionary) -> FieldNode {
    FieldNode {
        object_id,
        name: resolve_entry(doc, dict, b"T").and_then(|obj| match obj {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            other => name_to_string(other),
        }),
        field_type: resolve_entry(doc, dict, b"FT").and_then(name_to_string),
        flags: resolve_entry(doc, dict, b"Ff").and_then(|obj| match obj {
            Object::Integer(n) => Some(*n as u32),
            other => object_to_f64(other).map(|f| f as u32),
        }),
        options: resolve_entry(doc, dict, b"Opt").and_then(|obj| read_options(doc, obj)),
        value: resolve_entry(doc, dict, b"V").and_then(object_to_text),
        rect: resolve_entry(doc, dict, b"Rect").and_then(|obj| read_rect(doc, obj)),
        subtype: resolve_entry(doc, dict, b"Subtype").and_then(name_to_string),
        parent_ref: dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok()),
        parent: None,
        kids: resolve_entry(doc, dict, b"Kids")
            .and_then(|obj| obj.as_array().ok())
            .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
            .unwrap_or_default(),
    }
}

/// Read a `/Rect` array as-is: `[x0 y0 x1 y1]`, no normalization.
fn read_rect(doc: &Document, obj: &Object) -> Option<BoundingBox> {
    let arr = obj.as_array().ok()?;
    if arr.len() < 4 {
        return None;
    }
    let mut coords = [0.0; 4];
    for (slot, item) in coords.iter_mut().zip(arr) {
        *slot = object_to_f64(resolve(doc, item)?)?;
    }
    Some(BoundingBox::from_pdf_rect(
        coords[0], coords[1], coords[2], coords[3],
    ))
}

/// Read an `/Opt` array. Pair entries `[export display]` yield the display
/// string; plain entries yield themselves.
fn read_options(doc: &Document, obj: &Object) -> Option<Vec<String>> {
    let arr = obj.as_array().ok()?;
    Some(
        arr.iter()
            .filter_map(|item| {
                let item = resolve(doc, item)?;
                match item {
                    Object::Array(pair) if pair.len() >= 2 => {
                        object_to_text(resolve(doc, &pair[1])?)
                    }
                    other => object_to_text(other),
                }
            })
            .collect(),
    )
}
