//! Prompt construction and reply parsing for LLM-backed enrichers.

use formschema_core::EnrichedField;

use super::{EnrichError, EnrichmentRequest};

const NOT_AVAILABLE: &str = "N/A";

/// Build the labeling prompt for one field.
pub fn build_prompt(request: &EnrichmentRequest<'_>) -> String {
    let options = if request.options.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        request.options.join(", ")
    };
    let nearby = if request.nearby_text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        request
            .nearby_text
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"You describe PDF form fields for a form-filling UI.

Field name: {name}
Field type: {field_type}
Page: {page}
Options: {options}
Default value: {default_value}
Nearby text (closest first): {nearby}

Reply with ONLY a JSON object of this shape:
{{
  "label": "clear human-readable label",
  "placeholder": "example input for text or date fields, or null",
  "help_text": "short guidance if the context suggests it, or null",
  "required": true or false,
  "type_override": null, or one of "text", "checkbox", "radio", "dropdown", "date", "signature" if you are confident the type is wrong,
  "group": "name shared with related fields, or null",
  "validation": null, or {{"max_length": n, "pattern": "regex", "min_value": n, "max_value": n}}
}}"#,
        name = request.field_name,
        field_type = request.heuristic_type,
        page = request.page,
        default_value = request.default_value.unwrap_or(NOT_AVAILABLE),
    )
}

/// Read an [`EnrichedField`] from the first JSON object in a model reply.
///
/// Text around the object (preambles, code fences) is ignored.
pub fn parse_reply(reply: &str) -> Result<EnrichedField, EnrichError> {
    let start = reply
        .find('{')
        .ok_or_else(|| EnrichError::InvalidResponse("no JSON object in reply".to_string()))?;
    let end = reply
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| EnrichError::InvalidResponse("unterminated JSON object".to_string()))?;

    let enriched: EnrichedField = serde_json::from_str(&reply[start..=end])
        .map_err(|e| EnrichError::InvalidResponse(format!("failed to parse field JSON: {e}")))?;
    if enriched.label.trim().is_empty() {
        return Err(EnrichError::InvalidResponse("empty label".to_string()));
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formschema_core::FieldType;

    #[test]
    fn prompt_carries_field_context() {
        let options = vec!["Single".to_string(), "Married".to_string()];
        let nearby = vec!["Filing status".to_string()];
        let request = EnrichmentRequest {
            field_name: "status",
            heuristic_type: FieldType::Radio,
            page: 2,
            options: &options,
            default_value: Some("Single"),
            nearby_text: &nearby,
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Field name: status"));
        assert!(prompt.contains("Field type: radio"));
        assert!(prompt.contains("Page: 2"));
        assert!(prompt.contains("Options: Single, Married"));
        assert!(prompt.contains("Default value: Single"));
        assert!(prompt.contains("Nearby text (closest first): \"Filing status\""));
    }

    #[test]
    fn prompt_marks_missing_context() {
        let request = EnrichmentRequest {
            field_name: "notes",
            heuristic_type: FieldType::Text,
            page: 1,
            options: &[],
            default_value: None,
            nearby_text: &[],
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Options: N/A"));
        assert!(prompt.contains("Default value: N/A"));
        assert!(prompt.contains("Nearby text (closest first): N/A"));
    }

    #[test]
    fn parse_fenced_reply() {
        let reply = r#"Here you go:
```json
{"label": "Date of Birth", "placeholder": "MM/DD/YYYY", "required": true,
 "type_override": "date", "validation": {"pattern": "^\\d{2}/\\d{2}/\\d{4}$"}}
```"#;
        let e = parse_reply(reply).unwrap();
        assert_eq!(e.label, "Date of Birth");
        assert!(e.required);
        assert_eq!(e.type_override, Some(FieldType::Date));
        assert_eq!(
            e.validation.unwrap().pattern.as_deref(),
            Some(r"^\d{2}/\d{2}/\d{4}$")
        );
    }

    #[test]
    fn parse_accepts_nulls_and_missing_members() {
        let e = parse_reply(r#"{"label": "Email", "placeholder": null, "group": null}"#).unwrap();
        assert_eq!(e.label, "Email");
        assert!(!e.required);
        assert!(e.placeholder.is_none());
    }

    #[test]
    fn parse_rejects_unusable_replies() {
        for reply in ["no json here", "} backwards {", r#"{"placeholder": "x"}"#, r#"{"label": "  "}"#] {
            let err = parse_reply(reply).unwrap_err();
            assert!(matches!(err, EnrichError::InvalidResponse(_)), "{reply}");
            assert!(!err.is_retryable());
        }
    }
}
