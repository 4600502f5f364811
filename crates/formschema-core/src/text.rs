//! Positioned text recovered from a page, used as label-lookup data.

use crate::BoundingBox;

/// One contiguous styled text fragment on a page.
///
/// `level` is a per-page heading rank derived from font size: 0 is the most
/// prominent size on that page. Levels are not comparable across pages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    pub text: String,
    /// 1-indexed page number.
    pub page: usize,
    pub bbox: Option<BoundingBox>,
    pub level: u32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, page: usize, bbox: Option<BoundingBox>, level: u32) -> Self {
        Self {
            text: text.into(),
            page,
            bbox,
            level,
        }
    }
}
