//! Per-field semantic description produced by an enrichment collaborator.

use crate::FieldType;

/// Validation constraints a UI should enforce on a field.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldValidation {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_length: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub pattern: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_value: Option<f64>,
}

impl FieldValidation {
    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none()
            && self.pattern.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
    }
}

/// Semantic metadata for one raw field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnrichedField {
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub placeholder: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub help_text: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    /// Replaces the heuristic type when present.
    #[cfg_attr(feature = "serde", serde(default, alias = "field_type_override"))]
    pub type_override: Option<FieldType>,
    /// Logical group name, e.g. `filing_status` for related checkboxes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub validation: Option<FieldValidation>,
}

impl EnrichedField {
    /// A description carrying only a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            placeholder: None,
            help_text: None,
            required: false,
            type_override: None,
            group: None,
            validation: None,
        }
    }

    /// The minimal description used when enrichment fails for good:
    /// the raw name as label, not required, the radio group if any.
    pub fn fallback(field_name: &str, radio_group: Option<&str>) -> Self {
        Self {
            group: radio_group.map(str::to_string),
            ..Self::labeled(field_name)
        }
    }
}
