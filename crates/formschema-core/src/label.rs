//! Spatial label association.
//!
//! Ranks the text runs on a field's page by the distance between box
//! centers. Runs left of or above the field get a multiplicative bias
//! because form labels conventionally sit there.

use crate::{BoundingBox, TextRun};

/// Tuning for [`nearby_labels`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMatchOptions {
    /// Runs farther than this (unbiased, in page units) are discarded.
    pub max_distance: f64,
    /// Number of candidates returned.
    pub top_k: usize,
    /// Distance multiplier for runs left of or above the field.
    pub bias: f64,
}

impl Default for LabelMatchOptions {
    fn default() -> Self {
        Self {
            max_distance: 150.0,
            top_k: 5,
            bias: 0.7,
        }
    }
}

/// A ranked label candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    /// Trimmed run text.
    pub text: String,
    /// Distance after the positional bias.
    pub score: f64,
}

/// Whether a run centered at `(x, y)` sits left of or above the field center.
///
/// Inclusive on both axes; satisfying both still counts once. "Above" is a
/// larger y in the bottom-left coordinate space.
fn is_label_side(field: &BoundingBox, x: f64, y: f64) -> bool {
    x <= field.center_x() || y >= field.center_y()
}

/// Rank the text runs near a field, best first, with their biased distances.
///
/// Returns an empty list when the field has no bounding box. Ties keep the
/// runs' input order.
pub fn rank_label_candidates(
    field_bbox: Option<&BoundingBox>,
    page: usize,
    runs: &[TextRun],
    options: &LabelMatchOptions,
) -> Vec<LabelCandidate> {
    let Some(field) = field_bbox else {
        return Vec::new();
    };

    let mut candidates: Vec<LabelCandidate> = runs
        .iter()
        .filter(|run| run.page == page)
        .filter_map(|run| {
            let bbox = run.bbox.as_ref()?;
            let text = run.text.trim();
            if text.is_empty() {
                return None;
            }
            let distance = field.center_distance(bbox);
            if distance > options.max_distance {
                return None;
            }
            let score = if is_label_side(field, bbox.center_x(), bbox.center_y()) {
                distance * options.bias
            } else {
                distance
            };
            Some(LabelCandidate {
                text: text.to_string(),
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
    candidates.truncate(options.top_k);
    candidates
}

/// The top-K label strings near a field, best first.
pub fn nearby_labels(
    field_bbox: Option<&BoundingBox>,
    page: usize,
    runs: &[TextRun],
    options: &LabelMatchOptions,
) -> Vec<String> {
    rank_label_candidates(field_bbox, page, runs, options)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered(text: &str, page: usize, cx: f64, cy: f64) -> TextRun {
        TextRun::new(
            text,
            page,
            Some(BoundingBox::new(cx - 5.0, cy + 5.0, cx + 5.0, cy - 5.0)),
            0,
        )
    }

    fn field_at(cx: f64, cy: f64) -> BoundingBox {
        BoundingBox::new(cx - 50.0, cy + 10.0, cx + 50.0, cy - 10.0)
    }

    #[test]
    fn left_of_field_is_biased() {
        let field = field_at(100.0, 700.0);
        let runs = vec![centered("Name:", 1, 50.0, 700.0)];
        let ranked = rank_label_candidates(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 35.0).abs() < 1e-9);
    }

    #[test]
    fn right_and_below_is_unbiased() {
        let field = field_at(100.0, 700.0);
        let runs = vec![centered("note", 1, 150.0, 650.0)];
        let ranked = rank_label_candidates(Some(&field), 1, &runs, &LabelMatchOptions::default());
        let raw = 50.0_f64.hypot(50.0);
        assert!((ranked[0].score - raw).abs() < 1e-9);
    }

    #[test]
    fn above_and_left_bias_applies_once() {
        let field = field_at(100.0, 700.0);
        let runs = vec![centered("Title", 1, 70.0, 740.0)];
        let ranked = rank_label_candidates(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert!((ranked[0].score - 50.0 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn directly_above_on_the_same_column_is_biased() {
        let field = field_at(100.0, 700.0);
        let runs = vec![centered("Email", 1, 130.0, 720.0)];
        let ranked = rank_label_candidates(Some(&field), 1, &runs, &LabelMatchOptions::default());
        let raw = 30.0_f64.hypot(20.0);
        assert!((ranked[0].score - raw * 0.7).abs() < 1e-9);
    }

    #[test]
    fn far_runs_are_excluded_before_bias() {
        let field = field_at(100.0, 700.0);
        // 160 units to the left: biased it would be 112, but it is past the cutoff.
        let runs = vec![
            centered("Far label", 1, -60.0, 700.0),
            centered("Near", 1, 200.0, 690.0),
        ];
        let labels = nearby_labels(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert_eq!(labels, vec!["Near".to_string()]);
    }

    #[test]
    fn ranking_prefers_biased_side() {
        let field = field_at(100.0, 700.0);
        let runs = vec![
            centered("right", 1, 140.0, 690.0),
            centered("left", 1, 50.0, 700.0),
        ];
        let labels = nearby_labels(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert_eq!(labels, vec!["left".to_string(), "right".to_string()]);
    }

    #[test]
    fn filters_page_missing_bbox_and_blank_text() {
        let field = field_at(100.0, 700.0);
        let runs = vec![
            centered("other page", 2, 60.0, 700.0),
            TextRun::new("no box", 1, None, 0),
            centered("   ", 1, 60.0, 700.0),
            centered("  Phone  ", 1, 60.0, 700.0),
        ];
        let labels = nearby_labels(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert_eq!(labels, vec!["Phone".to_string()]);
    }

    #[test]
    fn truncates_to_top_k() {
        let field = field_at(100.0, 700.0);
        let runs: Vec<TextRun> = (0..8)
            .map(|i| centered(&format!("t{i}"), 1, 90.0 - i as f64 * 5.0, 700.0))
            .collect();
        let labels = nearby_labels(Some(&field), 1, &runs, &LabelMatchOptions::default());
        assert_eq!(labels, vec!["t0", "t1", "t2", "t3", "t4"]);

        let options = LabelMatchOptions {
            top_k: 2,
            ..LabelMatchOptions::default()
        };
        assert_eq!(nearby_labels(Some(&field), 1, &runs, &options).len(), 2);
    }

    #[test]
    fn no_bbox_yields_no_candidates() {
        let runs = vec![centered("Sign here", 1, 50.0, 700.0)];
        assert!(nearby_labels(None, 1, &runs, &LabelMatchOptions::default()).is_empty());
    }
}
