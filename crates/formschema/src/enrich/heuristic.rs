//! Offline enrichment from field names and nearby text.

use formschema_core::{EnrichedField, FieldType};

use super::{EnrichError, EnrichmentRequest, FieldEnricher};

/// Placeholder suggested for date fields.
pub const DATE_PLACEHOLDER: &str = "MM/DD/YYYY";

/// Labels fields without calling any service.
///
/// The label is the closest nearby text with a trailing colon removed, or
/// the field name rewritten as words when no text is near. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEnricher;

impl HeuristicEnricher {
    pub fn new() -> Self {
        Self
    }
}

impl FieldEnricher for HeuristicEnricher {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        let label = request
            .nearby_text
            .iter()
            .map(|text| text.trim().trim_end_matches(':').trim_end())
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| humanize(request.field_name));

        let mut enriched = EnrichedField::labeled(label);
        if request.heuristic_type == FieldType::Date {
            enriched.placeholder = Some(DATE_PLACEHOLDER.to_string());
        }
        Ok(enriched)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// `first_name` -> `First Name`, `homeAddress[0]` -> `Home Address 0`.
pub fn humanize(field_name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in field_name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    if words.is_empty() {
        return field_name.to_string();
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
