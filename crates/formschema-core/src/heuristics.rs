//! Name-and-context heuristics that refine text fields before enrichment.

use std::sync::LazyLock;

use regex::Regex;

use crate::FieldType;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(date|dob|birth|mm.?dd|dd.?mm|yyyy|month.?day|day.?month)")
        .expect("date pattern is valid")
});

static SIGNATURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(sign(ature)?|sig[_\s]|autograph)").expect("signature pattern is valid")
});

fn combined(field_name: &str, nearby: &[String]) -> String {
    let mut text = String::with_capacity(field_name.len() + 1 + nearby.len() * 16);
    text.push_str(field_name);
    text.push(' ');
    text.push_str(&nearby.join(" "));
    text
}

/// Whether the field name or its nearby text reads like a date input.
pub fn looks_like_date(field_name: &str, nearby: &[String]) -> bool {
    DATE_PATTERN.is_match(&combined(field_name, nearby))
}

/// Whether the field name or its nearby text reads like a signature input.
pub fn looks_like_signature(field_name: &str, nearby: &[String]) -> bool {
    SIGNATURE_PATTERN.is_match(&combined(field_name, nearby))
}

/// Refine a PDF-derived type using the field name and nearby text.
///
/// Only text fields are re-classified. Signature vocabulary is checked
/// before date vocabulary, so "Signature date" becomes a signature.
pub fn heuristic_type(pdf_type: FieldType, field_name: &str, nearby: &[String]) -> FieldType {
    if pdf_type != FieldType::Text {
        return pdf_type;
    }
    if looks_like_signature(field_name, nearby) {
        FieldType::Signature
    } else if looks_like_date(field_name, nearby) {
        FieldType::Date
    } else {
        FieldType::Text
    }
}
