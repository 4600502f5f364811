//! Fonts as seen by the text-run interpreter.
//!
//! A [`PdfFont`] turns the bytes of a shown string into character codes,
//! text and glyph advances. Simple fonts use one byte per code and decode
//! through their base encoding plus `/Differences`; Type0 fonts use two-byte
//! codes and are only readable through a `/ToUnicode` map. Widths come from
//! `/Widths` (simple), `/W` and `/DW` (CID descendants), or the built-in
//! tables for the common standard fonts.

use std::collections::HashMap;

use encoding_rs::Encoding;
use lopdf::{Dictionary, Document, Object};

use crate::decode::{name_to_string, object_to_f64, stream_content};
use crate::resolver::{resolve, resolve_entry};

/// Advance assumed when a font gives no width for a code (glyph units).
const ESTIMATED_WIDTH: f64 = 500.0;
/// `/DW` default for CID fonts.
const CID_DEFAULT_WIDTH: f64 = 1000.0;
/// Upper bound on codes expanded from one CMap or `/W` range.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// Character code to Unicode mapping read from a `/ToUnicode` CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeMap {
    /// Parse the `bfchar` and `bfrange` sections of a CMap stream.
    ///
    /// Entries that do not parse are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let tokens = tokenize(section);
            for pair in tokens.chunks_exact(2) {
                if let [Token::Hex(src), Token::Hex(dst)] = pair {
                    if let (Some(code), Some(value)) = (parse_code(src), utf16_hex(dst)) {
                        mappings.insert(code, value);
                    }
                }
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            let tokens = tokenize(section);
            let mut rest = tokens.as_slice();
            while let [Token::Hex(lo), Token::Hex(hi), tail @ ..] = rest {
                let range = match (parse_code(lo), parse_code(hi)) {
                    (Some(lo), Some(hi)) if hi >= lo && hi - lo <= MAX_RANGE_SPAN => Some(lo..=hi),
                    _ => None,
                };
                match tail {
                    [Token::Hex(dst), after @ ..] => {
                        if let (Some(range), Some(units)) = (range, hex_units(dst)) {
                            for (offset, code) in range.enumerate() {
                                let mut units = units.clone();
                                if let Some(last) = units.last_mut() {
                                    *last = last.wrapping_add(offset as u16);
                                }
                                if let Ok(value) = String::from_utf16(&units) {
                                    mappings.insert(code, value);
                                }
                            }
                        }
                        rest = after;
                    }
                    [Token::ArrayStart, after @ ..] => {
                        let end = after
                            .iter()
                            .position(|t| matches!(t, Token::ArrayEnd))
                            .unwrap_or(after.len());
                        if let Some(range) = range {
                            for (code, token) in range.zip(&after[..end]) {
                                if let Token::Hex(dst) = token {
                                    if let Some(value) = utf16_hex(dst) {
                                        mappings.insert(code, value);
                                    }
                                }
                            }
                        }
                        rest = after.get(end + 1..).unwrap_or(&[]);
                    }
                    _ => break,
                }
            }
        }

        Self { mappings }
    }

    /// Unicode text for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(String),
    ArrayStart,
    ArrayEnd,
}

/// Bodies between every `begin`/`end` keyword pair.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        let Some(stop) = body.find(end) else {
            break;
        };
        found.push(&body[..stop]);
        rest = &body[stop + end.len()..];
    }
    found
}

fn tokenize(section: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = section;
    while let Some(pos) = rest.find(['<', '[', ']']) {
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix('[') {
            tokens.push(Token::ArrayStart);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(']') {
            tokens.push(Token::ArrayEnd);
            rest = after;
        } else {
            let Some(end) = tail.find('>') else {
                break;
            };
            let hex: String = tail[1..end].chars().filter(|c| !c.is_whitespace()).collect();
            tokens.push(Token::Hex(hex));
            rest = &tail[end + 1..];
        }
    }
    tokens
}

fn parse_code(hex: &str) -> Option<u32> {
    if hex.is_empty() || hex.len() > 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// UTF-16BE code units written as hex; a lone byte is widened.
fn hex_units(hex: &str) -> Option<Vec<u16>> {
    let hex = if hex.len() == 2 { format!("00{hex}") } else { hex.to_string() };
    if hex.is_empty() || hex.len() % 4 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(4)
        .map(|i| u16::from_str_radix(&hex[i..i + 4], 16).ok())
        .collect()
}

fn utf16_hex(hex: &str) -> Option<String> {
    String::from_utf16(&hex_units(hex)?).ok()
}

/// A font resource resolved for decoding and measuring shown strings.
#[derive(Debug, Clone)]
pub struct PdfFont {
    two_byte: bool,
    to_unicode: Option<ToUnicodeMap>,
    encoding: &'static Encoding,
    differences: HashMap<u32, String>,
    widths: HashMap<u32, f64>,
    standard: Option<&'static StandardWidths>,
    default_width: f64,
}

impl Default for PdfFont {
    fn default() -> Self {
        Self {
            two_byte: false,
            to_unicode: None,
            encoding: encoding_rs::WINDOWS_1252,
            differences: HashMap::new(),
            widths: HashMap::new(),
            standard: None,
            default_width: ESTIMATED_WIDTH,
        }
    }
}

impl PdfFont {
    /// Read a font dictionary. Missing or malformed entries fall back to
    /// Windows-1252 decoding and estimated widths.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let mut font = Self::default();
        let subtype = resolve_entry(doc, dict, b"Subtype").and_then(name_to_string);

        font.to_unicode = resolve_entry(doc, dict, b"ToUnicode")
            .and_then(|obj| obj.as_stream().ok())
            .and_then(|stream| stream_content(stream).ok())
            .map(|data| ToUnicodeMap::parse(&data))
            .filter(|map| !map.is_empty());

        if subtype.as_deref() == Some("Type0") {
            font.two_byte = true;
            font.default_width = CID_DEFAULT_WIDTH;
            if let Some(descendant) = resolve_entry(doc, dict, b"DescendantFonts")
                .and_then(|obj| obj.as_array().ok())
                .and_then(|fonts| fonts.first())
                .and_then(|obj| resolve(doc, obj))
                .and_then(|obj| obj.as_dict().ok())
            {
                if let Some(dw) = resolve_entry(doc, descendant, b"DW").and_then(object_to_f64) {
                    font.default_width = dw;
                }
                if let Some(w) = resolve_entry(doc, descendant, b"W").and_then(|o| o.as_array().ok()) {
                    read_cid_widths(doc, w, &mut font.widths);
                }
            }
            return font;
        }

        match resolve_entry(doc, dict, b"Encoding") {
            Some(Object::Dictionary(enc)) => {
                if let Some(base) = resolve_entry(doc, enc, b"BaseEncoding").and_then(name_to_string) {
                    font.encoding = base_encoding(&base);
                }
                if let Some(diffs) = resolve_entry(doc, enc, b"Differences").and_then(|o| o.as_array().ok()) {
                    read_differences(doc, diffs, &mut font.differences);
                }
            }
            Some(other) => {
                if let Some(name) = name_to_string(other) {
                    font.encoding = base_encoding(&name);
                }
            }
            None => {}
        }

        let first_char = resolve_entry(doc, dict, b"FirstChar")
            .and_then(object_to_f64)
            .unwrap_or(0.0) as u32;
        if let Some(widths) = resolve_entry(doc, dict, b"Widths").and_then(|o| o.as_array().ok()) {
            for (i, w) in widths.iter().enumerate() {
                if let Some(w) = resolve(doc, w).and_then(object_to_f64) {
                    font.widths.insert(first_char + i as u32, w);
                }
            }
        } else if let Some(base_font) = resolve_entry(doc, dict, b"BaseFont").and_then(name_to_string) {
            font.standard = standard_widths(&base_font);
        }
        if let Some(missing) = resolve_entry(doc, dict, b"FontDescriptor")
            .and_then(|o| o.as_dict().ok())
            .and_then(|fd| resolve_entry(doc, fd, b"MissingWidth"))
            .and_then(object_to_f64)
            .filter(|w| *w > 0.0)
        {
            font.default_width = missing;
        }
        font
    }

    /// Whether codes are two bytes wide.
    pub fn is_two_byte(&self) -> bool {
        self.two_byte
    }

    /// Split shown string bytes into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Text for one code; empty when the font gives no way to read it.
    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|map| map.lookup(code)) {
            return text.to_string();
        }
        if self.two_byte {
            return String::new();
        }
        if let Some(text) = self.differences.get(&code) {
            return text.clone();
        }
        let byte = [code as u8];
        let (text, _) = self.encoding.decode_without_bom_handling(&byte);
        text.into_owned()
    }

    /// Advance of one code in glyph units (thousandths of the font size).
    pub fn width(&self, code: u32) -> f64 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        if let Some(table) = self.standard {
            if let Some(w) = table.width(code) {
                return w;
            }
        }
        self.default_width
    }
}

fn base_encoding(name: &str) -> &'static Encoding {
    match name {
        "MacRomanEncoding" => encoding_rs::MACINTOSH,
        _ => encoding_rs::WINDOWS_1252,
    }
}

/// `/Differences`: a starting code followed by glyph names for consecutive codes.
fn read_differences(doc: &Document, diffs: &[Object], out: &mut HashMap<u32, String>) {
    let mut code = 0u32;
    for entry in diffs {
        match resolve(doc, entry) {
            Some(Object::Integer(start)) => code = (*start).max(0) as u32,
            Some(Object::Name(name)) => {
                if let Some(text) = glyph_text(&String::from_utf8_lossy(name)) {
                    out.insert(code, text);
                }
                code += 1;
            }
            _ => {}
        }
    }
}

/// Text for the glyph names form generators commonly remap.
fn glyph_text(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("uni") {
        return utf16_hex(hex);
    }
    if name.len() == 1 && name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(name.to_string());
    }
    let text = match name {
        "space" => " ",
        "colon" => ":",
        "period" => ".",
        "comma" => ",",
        "hyphen" => "-",
        "slash" => "/",
        "underscore" => "_",
        "parenleft" => "(",
        "parenright" => ")",
        "zero" => "0",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        _ => return None,
    };
    Some(text.to_string())
}

/// `/W`: `c [w1 w2 ...]` or `c_first c_last w` entries.
fn read_cid_widths(doc: &Document, w: &[Object], out: &mut HashMap<u32, f64>) {
    let mut i = 0;
    while i < w.len() {
        let Some(first) = resolve(doc, &w[i]).and_then(object_to_f64) else {
            break;
        };
        let first = first as u32;
        match w.get(i + 1).and_then(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (k, width) in list.iter().enumerate() {
                    if let Some(width) = resolve(doc, width).and_then(object_to_f64) {
                        out.insert(first + k as u32, width);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(width)) = (
                    object_to_f64(last),
                    w.get(i + 2).and_then(|o| resolve(doc, o)).and_then(object_to_f64),
                ) else {
                    break;
                };
                let last = last as u32;
                if last >= first && last - first <= MAX_RANGE_SPAN {
                    for code in first..=last {
                        out.insert(code, width);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
}

/// Printable-ASCII advances (codes 32..=126) of a standard Type1 font.
#[derive(Debug)]
struct StandardWidths {
    ascii: [u16; 95],
}

impl StandardWidths {
    fn width(&self, code: u32) -> Option<f64> {
        let index = code.checked_sub(32)? as usize;
        self.ascii.get(index).map(|w| f64::from(*w))
    }
}

/// Built-in widths by base font name; a subset tag (`ABCDEF+`) is ignored.
fn standard_widths(base_font: &str) -> Option<&'static StandardWidths> {
    let name = match base_font.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 => rest,
        _ => base_font,
    };
    match name {
        "Helvetica" | "Helvetica-Oblique" | "Arial" | "ArialMT" => Some(&HELVETICA),
        "Helvetica-Bold" | "Helvetica-BoldOblique" | "Arial-BoldMT" => Some(&HELVETICA_BOLD),
        "Times-Roman" | "TimesNewRomanPSMT" => Some(&TIMES_ROMAN),
        "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" => Some(&COURIER),
        _ => None,
    }
}

static COURIER: StandardWidths = StandardWidths { ascii: [600; 95] };

#[rustfmt::skip]
static HELVETICA: StandardWidths = StandardWidths {
    ascii: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
    ],
};

#[rustfmt::skip]
static HELVETICA_BOLD: StandardWidths = StandardWidths {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
    ],
};

#[rustfmt::skip]
static TIMES_ROMAN: StandardWidths = StandardWidths {
    ascii: [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
        921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
        556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
        333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
        500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
    ],
};
