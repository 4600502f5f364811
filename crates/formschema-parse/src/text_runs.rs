//! Positioned text-run extraction from page content streams.
//!
//! A lightweight interpreter over lopdf's decoded operations that tracks the
//! graphics matrix (`q`, `Q`, `cm`), the text state (`BT`, `ET`, `Tf`, `Tc`,
//! `Tw`, `Tz`, `TL`, `Td`, `TD`, `Tm`, `T*`) and form XObjects (`Do`), and
//! records every text-showing operator (`Tj`, `TJ`, `'`, `"`). Shown bytes
//! are decoded and measured through the selected font resource.
//! Consecutive shows on one baseline at one size inside a text object merge
//! into a single run.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use formschema_core::{BoundingBox, TextRun};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::decode::{name_to_string, object_to_f64, stream_content};
use crate::font::PdfFont;
use crate::resolver::{resolve, resolve_entry};

/// `TJ` adjustments (thousandths of an em) beyond this are read as word gaps.
const WORD_GAP_ADJUSTMENT: f64 = 200.0;
/// Baselines closer than this are the same line.
const BASELINE_TOLERANCE: f64 = 0.5;
/// Horizontal gap, as a fraction of size, that inserts a space between shows.
const SPACE_GAP: f64 = 0.2;
/// Form XObjects nested deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 12;
/// Page-tree levels searched for inherited `/Resources`.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// A 2D affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let v: Vec<f64> = operands.iter().map(object_to_f64).collect::<Option<_>>()?;
        match v.as_slice() {
            [a, b, c, d, e, f] => Some(Self {
                a: *a,
                b: *b,
                c: *c,
                d: *d,
                e: *e,
                f: *f,
            }),
            _ => None,
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f64 {
        self.a.hypot(self.b)
    }

    fn vertical_scale(&self) -> f64 {
        self.c.hypot(self.d)
    }
}

/// Text state parameters saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct TextParams {
    font: Rc<PdfFont>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: Rc::new(PdfFont::default()),
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct SavedState {
    ctm: Matrix,
    params: TextParams,
}

/// One show operation placed on the page.
#[derive(Debug, Clone)]
struct Placed {
    text: String,
    left: f64,
    right: f64,
    baseline: f64,
    size: f64,
}

/// A run being accumulated from consecutive shows.
#[derive(Debug)]
struct PendingRun {
    text: String,
    left: f64,
    right: f64,
    baseline: f64,
    size: f64,
}

impl PendingRun {
    fn accepts(&self, next: &Placed) -> bool {
        (self.baseline - next.baseline).abs() < BASELINE_TOLERANCE
            && (self.size - next.size).abs() < 0.1
            && next.left >= self.left
    }

    fn push(&mut self, next: Placed) {
        if next.left - self.right > self.size * SPACE_GAP && !self.text.ends_with(' ') {
            self.text.push(' ');
        }
        self.text.push_str(&next.text);
        self.right = self.right.max(next.right);
    }
}

/// Sized run before heading levels are assigned.
#[derive(Debug)]
struct SizedRun {
    text: String,
    bbox: BoundingBox,
    size: f64,
}

#[derive(Debug)]
struct Interpreter<'a> {
    doc: &'a Document,
    fonts: HashMap<ObjectId, Rc<PdfFont>>,
    /// Form XObjects currently being interpreted, outermost first.
    active_forms: Vec<ObjectId>,
    form_depth: usize,
    ctm: Matrix,
    stack: Vec<SavedState>,
    params: TextParams,
    text_matrix: Option<Matrix>,
    line_matrix: Option<Matrix>,
    pending: Option<PendingRun>,
    runs: Vec<SizedRun>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fonts: HashMap::new(),
            active_forms: Vec::new(),
            form_depth: 0,
            ctm: Matrix::default(),
            stack: Vec::new(),
            params: TextParams::default(),
            text_matrix: None,
            line_matrix: None,
            pending: None,
            runs: Vec::new(),
        }
    }

    fn run(&mut self, content: &Content, resources: &Dictionary) {
        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => self.stack.push(SavedState {
                    ctm: self.ctm,
                    params: self.params.clone(),
                }),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.ctm = saved.ctm;
                        self.params = saved.params;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.ctm = m.then(&self.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Some(Matrix::IDENTITY);
                    self.line_matrix = Some(Matrix::IDENTITY);
                }
                "ET" => {
                    self.flush();
                    self.text_matrix = None;
                    self.line_matrix = None;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.params.font = self.font(resources, name);
                    }
                    if let Some(size) = operands.get(1).and_then(object_to_f64) {
                        self.params.size = size;
                    }
                }
                "Tc" => {
                    if let Some(spacing) = operands.first().and_then(object_to_f64) {
                        self.params.char_spacing = spacing;
                    }
                }
                "Tw" => {
                    if let Some(spacing) = operands.first().and_then(object_to_f64) {
                        self.params.word_spacing = spacing;
                    }
                }
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(object_to_f64) {
                        self.params.horizontal_scaling = scale / 100.0;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(object_to_f64) {
                        self.params.leading = leading;
                    }
                }
                "Td" => self.move_text(operands),
                "TD" => {
                    if let Some(ty) = operands.get(1).and_then(object_to_f64) {
                        self.params.leading = -ty;
                    }
                    self.move_text(operands);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.text_matrix = Some(m);
                        self.line_matrix = Some(m);
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(obj) = operands.first() {
                        self.show(std::slice::from_ref(obj));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show(items);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(obj) = operands.first() {
                        self.show(std::slice::from_ref(obj));
                    }
                }
                "\"" => {
                    if let Some(aw) = operands.first().and_then(object_to_f64) {
                        self.params.word_spacing = aw;
                    }
                    if let Some(ac) = operands.get(1).and_then(object_to_f64) {
                        self.params.char_spacing = ac;
                    }
                    self.next_line();
                    if let Some(obj) = operands.get(2) {
                        self.show(std::slice::from_ref(obj));
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.form_xobject(resources, name);
                    }
                }
                _ => {}
            }
        }
        self.flush();
    }

    /// Font resource `name`, cached per object. Unknown names read as the
    /// default single-byte font.
    fn font(&mut self, resources: &Dictionary, name: &[u8]) -> Rc<PdfFont> {
        let doc = self.doc;
        let entry = resolve_entry(doc, resources, b"Font")
            .and_then(|fonts| fonts.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok());
        match entry {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.fonts.get(id) {
                    return Rc::clone(font);
                }
                let font = Rc::new(
                    doc.get_object(*id)
                        .ok()
                        .and_then(|obj| resolve(doc, obj))
                        .and_then(|obj| obj.as_dict().ok())
                        .map(|dict| PdfFont::from_dict(doc, dict))
                        .unwrap_or_default(),
                );
                self.fonts.insert(*id, Rc::clone(&font));
                font
            }
            Some(Object::Dictionary(dict)) => Rc::new(PdfFont::from_dict(doc, dict)),
            _ => {
                debug!(font = %String::from_utf8_lossy(name), "font resource not found");
                Rc::new(PdfFont::default())
            }
        }
    }

    /// Interpret a form XObject in place: its `/Matrix` applies on top of the
    /// current CTM, its own `/Resources` (else the caller's) are in scope,
    /// and the graphics state is restored afterwards.
    fn form_xobject(&mut self, resources: &Dictionary, name: &[u8]) {
        let doc = self.doc;
        let Some(entry) = resolve_entry(doc, resources, b"XObject")
            .and_then(|xobjects| xobjects.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
        else {
            return;
        };
        let id = match entry {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        if id.is_some_and(|id| self.active_forms.contains(&id)) {
            warn!(xobject = %String::from_utf8_lossy(name), "skipping recursive form XObject");
            return;
        }
        if self.form_depth >= MAX_FORM_DEPTH {
            warn!(xobject = %String::from_utf8_lossy(name), "form XObjects nested too deeply");
            return;
        }
        let Some(stream) = resolve(doc, entry).and_then(|obj| obj.as_stream().ok()) else {
            return;
        };
        if resolve_entry(doc, &stream.dict, b"Subtype")
            .and_then(name_to_string)
            .as_deref()
            != Some("Form")
        {
            return;
        }
        let content = match stream_content(stream).map(|bytes| Content::decode(&bytes)) {
            Ok(Ok(content)) => content,
            Ok(Err(e)) | Err(e) => {
                warn!(xobject = %String::from_utf8_lossy(name), "failed to decode form XObject: {e}");
                return;
            }
        };
        let form_resources = resolve_entry(doc, &stream.dict, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
            .unwrap_or(resources);

        self.flush();
        let saved = SavedState {
            ctm: self.ctm,
            params: self.params.clone(),
        };
        let text_matrix = self.text_matrix.take();
        let line_matrix = self.line_matrix.take();
        if let Some(m) = resolve_entry(doc, &stream.dict, b"Matrix")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|values| Matrix::from_operands(values))
        {
            self.ctm = m.then(&self.ctm);
        }

        self.form_depth += 1;
        self.active_forms.extend(id);
        self.run(&content, form_resources);
        if id.is_some() {
            self.active_forms.pop();
        }
        self.form_depth -= 1;

        self.ctm = saved.ctm;
        self.params = saved.params;
        self.text_matrix = text_matrix;
        self.line_matrix = line_matrix;
    }

    fn move_text(&mut self, operands: &[Object]) {
        let tx = operands.first().and_then(object_to_f64).unwrap_or(0.0);
        let ty = operands.get(1).and_then(object_to_f64).unwrap_or(0.0);
        self.translate_line(tx, ty);
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.params.leading);
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        let line = Matrix::translate(tx, ty).then(&self.line_matrix.unwrap_or(Matrix::IDENTITY));
        self.line_matrix = Some(line);
        self.text_matrix = Some(line);
    }

    /// Show strings and `TJ` adjustments, advancing the text matrix.
    fn show(&mut self, items: &[Object]) {
        // Text shown outside BT/ET is malformed; ignore it.
        let Some(start_matrix) = self.text_matrix else {
            return;
        };
        let params = &self.params;
        let font = Rc::clone(&params.font);
        let size = params.size;
        let scale = params.horizontal_scaling;

        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    for code in font.codes(bytes) {
                        text.extend(font.decode(code).chars().filter(|c| !c.is_control()));
                        let mut step = font.width(code) / 1000.0 * size + params.char_spacing;
                        if !font.is_two_byte() && code == 32 {
                            step += params.word_spacing;
                        }
                        advance += step * scale;
                    }
                }
                other => {
                    if let Some(adjust) = object_to_f64(other) {
                        advance -= adjust / 1000.0 * size * scale;
                        if adjust < -WORD_GAP_ADJUSTMENT && !text.is_empty() && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
            }
        }
        self.text_matrix = Some(Matrix::translate(advance, 0.0).then(&start_matrix));

        if text.trim().is_empty() {
            return;
        }
        let rendering = start_matrix.then(&self.ctm);
        let size = size * rendering.vertical_scale();
        let width = advance * rendering.horizontal_scale();
        let placed = Placed {
            text,
            left: rendering.e,
            right: rendering.e + width,
            baseline: rendering.f,
            size,
        };

        match self.pending.as_mut() {
            Some(pending) if pending.accepts(&placed) => pending.push(placed),
            _ => {
                self.flush();
                self.pending = Some(PendingRun {
                    text: placed.text,
                    left: placed.left,
                    right: placed.right,
                    baseline: placed.baseline,
                    size: placed.size,
                });
            }
        }
    }

    fn flush(&mut self) {
        if let Some(run) = self.pending.take() {
            let text = run.text.trim().to_string();
            if text.is_empty() {
                return;
            }
            self.runs.push(SizedRun {
                text,
                bbox: BoundingBox::new(run.left, run.baseline + run.size, run.right, run.baseline),
                size: run.size,
            });
        }
    }
}

/// Size bucket used for heading ranks (0.1-unit resolution).
fn size_key(size: f64) -> i64 {
    (size * 10.0).round() as i64
}

/// Assign per-page heading levels: 0 for the largest size, 1 for the next.
fn assign_levels(runs: Vec<SizedRun>, page: usize) -> Vec<TextRun> {
    let sizes: BTreeSet<i64> = runs.iter().map(|r| size_key(r.size)).collect();
    let descending: Vec<i64> = sizes.into_iter().rev().collect();
    runs.into_iter()
        .map(|run| {
            let key = size_key(run.size);
            let level = descending.iter().position(|&s| s == key).unwrap_or(0) as u32;
            TextRun::new(run.text, page, Some(run.bbox), level)
        })
        .collect()
}

/// The page's `/Resources`, inherited from the page tree when absent.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Some(resources) = resolve_entry(doc, node, b"Resources").and_then(|obj| obj.as_dict().ok()) {
            return Some(resources);
        }
        node = resolve_entry(doc, node, b"Parent").and_then(|obj| obj.as_dict().ok())?;
    }
    None
}

/// Extract the text runs of one page.
///
/// A page whose content cannot be read or decoded yields no runs.
pub fn page_text_runs(doc: &Document, page_id: ObjectId, page: usize) -> Vec<TextRun> {
    let bytes = match doc.get_page_content(page_id) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(page, "failed to read page content: {e}");
            return Vec::new();
        }
    };
    let content = match Content::decode(&bytes) {
        Ok(content) => content,
        Err(e) => {
            warn!(page, "failed to decode page content stream: {e}");
            return Vec::new();
        }
    };

    let empty = Dictionary::new();
    let resources = page_resources(doc, page_id).unwrap_or(&empty);
    let mut interpreter = Interpreter::new(doc);
    interpreter.run(&content, resources);
    debug!(page, runs = interpreter.runs.len(), "extracted text runs");
    assign_levels(interpreter.runs, page)
}

/// Extract the text runs of every page in document order.
pub fn extract_text_runs(doc: &Document) -> Vec<TextRun> {
    doc.get_pages()
        .into_iter()
        .flat_map(|(page_number, page_id)| page_text_runs(doc, page_id, page_number as usize))
        .collect()
}
