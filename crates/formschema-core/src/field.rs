//! Form field types and the PDF-to-semantic field classifier.
//!
//! [`FieldCategory`] mirrors the `/FT` entry of a field dictionary
//! (PDF 1.7 Table 220). [`FieldType`] is what a form-rendering UI consumes.
//! [`classify`] maps one to the other using the `/Ff` flag bits.

use std::fmt;

use crate::BoundingBox;

/// Radio flag (bit 16) of a button field's `/Ff`.
pub const FF_RADIO: u32 = 1 << 15;
/// Pushbutton flag (bit 17) of a button field's `/Ff`.
pub const FF_PUSHBUTTON: u32 = 1 << 16;
/// Combo flag (bit 18) of a choice field's `/Ff`.
pub const FF_COMBO: u32 = 1 << 17;

/// The PDF field category from a field's `/FT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// `/FT /Btn`: checkboxes, radio buttons, push buttons.
    Button,
    /// `/FT /Tx`: free text input.
    Text,
    /// `/FT /Ch`: combo boxes and list boxes.
    Choice,
    /// `/FT /Sig`: signature field.
    Signature,
}

impl FieldCategory {
    /// Parse a category from its PDF name (without the leading `/`).
    ///
    /// Returns `None` if the name is not a recognized field type.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Btn" => Some(Self::Button),
            "Tx" => Some(Self::Text),
            "Ch" => Some(Self::Choice),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Return the PDF name for this category.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            Self::Button => "Btn",
            Self::Text => "Tx",
            Self::Choice => "Ch",
            Self::Signature => "Sig",
        }
    }
}

/// The semantic type of a form field as presented to a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FieldType {
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Date,
    Signature,
}

impl FieldType {
    /// Lowercase identifier used in JSON output and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Dropdown => "dropdown",
            Self::Date => "date",
            Self::Signature => "signature",
        }
    }

    /// Parse a lowercase identifier (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "checkbox" => Some(Self::Checkbox),
            "radio" => Some(Self::Radio),
            "dropdown" => Some(Self::Dropdown),
            "date" => Some(Self::Date),
            "signature" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Whether fields of this type carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a field from its `/FT` category and `/Ff` flags.
///
/// A missing or unrecognized category is treated as text; many generators
/// omit `/FT` on push-button-like widgets. Push buttons are text because
/// they carry no toggle state a form-filling UI can use, and both combo and
/// list boxes surface as dropdowns.
pub fn classify(category: Option<FieldCategory>, flags: u32) -> FieldType {
    match category {
        Some(FieldCategory::Text) | None => FieldType::Text,
        Some(FieldCategory::Button) => {
            if flags & FF_PUSHBUTTON != 0 {
                FieldType::Text
            } else if flags & FF_RADIO != 0 {
                FieldType::Radio
            } else {
                FieldType::Checkbox
            }
        }
        Some(FieldCategory::Choice) => FieldType::Dropdown,
        Some(FieldCategory::Signature) => FieldType::Signature,
    }
}

/// One form field as recovered from the PDF.
///
/// `name` is an identifying hint, not a key: malformed documents repeat
/// field trees across pages. Created once during extraction and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawField {
    /// Field name from `/T`, the parent's `/T`, or `"unnamed"`.
    pub name: String,
    /// Classified semantic type.
    pub field_type: FieldType,
    /// 1-indexed page number.
    pub page: usize,
    /// Widget rectangle, absent for some signature fields.
    pub bbox: Option<BoundingBox>,
    /// Value from `/V`, rendered as a string.
    pub default_value: Option<String>,
    /// Display strings from `/Opt`; empty unless dropdown or radio.
    pub options: Vec<String>,
    /// Group key for radio buttons.
    pub radio_group: Option<String>,
    /// Raw `/Ff` bits.
    pub flags: u32,
}
