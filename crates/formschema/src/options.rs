//! Tuning for a schema run.

use std::time::Duration;

use formschema_core::LabelMatchOptions;

/// Options for the field processing controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    /// Retryable failures tolerated per field before it is skipped.
    pub max_retries: u32,
    /// Upper bound on the backoff multiplier, in `backoff_unit`s.
    pub backoff_cap_secs: u64,
    /// Length of one backoff unit.
    pub backoff_unit: Duration,
    /// Label matcher tuning used for the pre-enrichment heuristics.
    pub label_match: LabelMatchOptions,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_cap_secs: 30,
            backoff_unit: Duration::from_secs(1),
            label_match: LabelMatchOptions::default(),
        }
    }
}
