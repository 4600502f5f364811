//! The field processing controller.
//!
//! Fields are enriched strictly one at a time in extraction order. The
//! retry, skip, and fallback policy is a small state machine: [`transition`]
//! is a pure function from a state and an attempt outcome to the next state
//! plus the [`Action`]s the driver must perform. The driver ([`process_fields`])
//! owns all side effects: heuristics, enricher calls, and backoff sleeps.

use std::thread;
use std::time::Duration;

use formschema_core::{
    EnrichedField, FieldType, OutputField, RawField, TextRun, heuristic_type, nearby_labels,
};
use tracing::{debug, info, warn};

use crate::enrich::{EnrichError, EnrichmentRequest, FieldEnricher};
use crate::options::ProcessingOptions;

/// Where the controller is in the field sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Field `i` has not been attempted.
    Pending(usize),
    /// An enrichment attempt for field `index` is due.
    AwaitingEnrichment { index: usize, retry_count: u32 },
    /// Field `i` has its final outcome; the cursor may advance.
    Resolved(usize),
    /// The cursor has passed the last field.
    AllDone,
    /// Fields are ready to be grouped into sections.
    GroupingReady,
}

impl ControllerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GroupingReady)
    }
}

/// The result of one enrichment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(EnrichedField),
    /// Rate limiting or a timeout.
    Retryable(String),
    /// Any other failure.
    Failed(String),
}

impl From<Result<EnrichedField, EnrichError>> for AttemptOutcome {
    fn from(result: Result<EnrichedField, EnrichError>) -> Self {
        match result {
            Ok(enriched) => Self::Success(enriched),
            Err(e) if e.is_retryable() => Self::Retryable(e.to_string()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// A side effect requested by [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Compute the heuristic type and nearby text for a field.
    Prepare { index: usize },
    /// Call the enricher for a field.
    Enrich { index: usize },
    /// Sleep for `units` backoff units before the next attempt.
    Backoff { index: usize, units: u64 },
    /// Keep the enricher's description.
    Accept { index: usize, enriched: EnrichedField },
    /// Keep a minimal description and record the field as failed.
    Fallback { index: usize },
    /// Drop the field and record it as failed.
    Skip { index: usize },
}

/// Retry bounds for [`transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_cap: u64,
}

impl RetryPolicy {
    fn backoff_units(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(63);
        (1u64 << exponent).min(self.backoff_cap)
    }
}

impl From<&ProcessingOptions> for RetryPolicy {
    fn from(options: &ProcessingOptions) -> Self {
        Self {
            max_retries: options.max_retries,
            backoff_cap: options.backoff_cap_secs,
        }
    }
}

/// Compute the next state and the actions that lead to it.
///
/// `outcome` is only consulted in [`ControllerState::AwaitingEnrichment`];
/// without one the attempt is simply requested again. A retryable failure
/// counts against the field first: while the count stays within
/// `max_retries` the same field is retried after a backoff of
/// `min(2^(count-1), cap)` units, past it the field is skipped.
pub fn transition(
    state: ControllerState,
    outcome: Option<AttemptOutcome>,
    field_count: usize,
    policy: &RetryPolicy,
) -> (ControllerState, Vec<Action>) {
    match state {
        ControllerState::Pending(index) if index >= field_count => (ControllerState::AllDone, vec![]),
        ControllerState::Pending(index) => (
            ControllerState::AwaitingEnrichment {
                index,
                retry_count: 0,
            },
            vec![Action::Prepare { index }, Action::Enrich { index }],
        ),
        ControllerState::AwaitingEnrichment { index, retry_count } => match outcome {
            None => (state, vec![Action::Enrich { index }]),
            Some(AttemptOutcome::Retryable(_)) => {
                let retry_count = retry_count + 1;
                if retry_count <= policy.max_retries {
                    (
                        ControllerState::AwaitingEnrichment { index, retry_count },
                        vec![
                            Action::Backoff {
                                index,
                                units: policy.backoff_units(retry_count),
                            },
                            Action::Enrich { index },
                        ],
                    )
                } else {
                    (ControllerState::Resolved(index), vec![Action::Skip { index }])
                }
            }
            Some(AttemptOutcome::Failed(_)) => {
                (ControllerState::Resolved(index), vec![Action::Fallback { index }])
            }
            Some(AttemptOutcome::Success(enriched)) => (
                ControllerState::Resolved(index),
                vec![Action::Accept { index, enriched }],
            ),
        },
        ControllerState::Resolved(index) => (ControllerState::Pending(index + 1), vec![]),
        ControllerState::AllDone | ControllerState::GroupingReady => {
            (ControllerState::GroupingReady, vec![])
        }
    }
}

/// The mutable cursor of a processing run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingState {
    /// Never decreases; stays put across retries of one field.
    pub current_field_index: usize,
    /// Resolved fields in extraction order, fallbacks included.
    pub enriched: Vec<OutputField>,
    /// Names of skipped and fallen-back fields.
    pub failed_fields: Vec<String>,
    /// Retryable failures on the current field; zero once it resolves.
    pub retry_count: u32,
    pub max_retries: u32,
}

impl ProcessingState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            current_field_index: 0,
            enriched: Vec::new(),
            failed_fields: Vec::new(),
            retry_count: 0,
            max_retries,
        }
    }

    fn sync(&mut self, state: ControllerState) {
        match state {
            ControllerState::Pending(index) => {
                self.current_field_index = index;
                self.retry_count = 0;
            }
            ControllerState::AwaitingEnrichment { index, retry_count } => {
                self.current_field_index = index;
                self.retry_count = retry_count;
            }
            ControllerState::Resolved(index) => {
                self.current_field_index = index;
                self.retry_count = 0;
            }
            ControllerState::AllDone | ControllerState::GroupingReady => self.retry_count = 0,
        }
    }
}

/// Blocks the driver between retries.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Per-field context computed once, before the first attempt.
#[derive(Debug, Clone)]
struct FieldContext {
    index: usize,
    heuristic_type: FieldType,
    nearby: Vec<String>,
}

impl FieldContext {
    fn prepare(index: usize, field: &RawField, text_runs: &[TextRun], options: &ProcessingOptions) -> Self {
        let nearby = nearby_labels(field.bbox.as_ref(), field.page, text_runs, &options.label_match);
        let heuristic = heuristic_type(field.field_type, &field.name, &nearby);
        debug!(
            field = %field.name,
            pdf_type = %field.field_type,
            heuristic_type = %heuristic,
            ?nearby,
            "prepared field"
        );
        Self {
            index,
            heuristic_type: heuristic,
            nearby,
        }
    }
}

/// The context for field `index`, prepared now if the slot holds none or
/// holds another field's.
fn context_for<'c>(
    slot: &'c mut Option<FieldContext>,
    index: usize,
    field: &RawField,
    text_runs: &[TextRun],
    options: &ProcessingOptions,
) -> &'c FieldContext {
    if slot.as_ref().is_some_and(|ctx| ctx.index != index) {
        *slot = None;
    }
    slot.get_or_insert_with(|| FieldContext::prepare(index, field, text_runs, options))
}

/// Run every field through the enricher and return the final cursor.
///
/// Never fails: enrichment errors become retries, skips, or fallbacks and
/// are reflected in [`ProcessingState::failed_fields`].
pub fn process_fields<E, S>(
    fields: &[RawField],
    text_runs: &[TextRun],
    enricher: &E,
    sleeper: &S,
    options: &ProcessingOptions,
) -> ProcessingState
where
    E: FieldEnricher + ?Sized,
    S: Sleeper + ?Sized,
{
    let policy = RetryPolicy::from(options);
    let mut processing = ProcessingState::new(options.max_retries);
    let mut state = ControllerState::Pending(0);
    let mut context: Option<FieldContext> = None;
    let mut outcome: Option<AttemptOutcome> = None;

    info!(
        count = fields.len(),
        enricher = enricher.name(),
        "processing form fields"
    );

    while !state.is_terminal() {
        let (next, actions) = transition(state, outcome.take(), fields.len(), &policy);
        state = next;
        processing.sync(state);

        for action in actions {
            match action {
                Action::Prepare { index } => {
                    context = Some(FieldContext::prepare(index, &fields[index], text_runs, options));
                }
                Action::Enrich { index } => {
                    let field = &fields[index];
                    let ctx = context_for(&mut context, index, field, text_runs, options);
                    let request = EnrichmentRequest {
                        field_name: &field.name,
                        heuristic_type: ctx.heuristic_type,
                        page: field.page,
                        options: &field.options,
                        default_value: field.default_value.as_deref(),
                        nearby_text: &ctx.nearby,
                    };
                    debug!(index, field = %field.name, "enriching field {}/{}", index + 1, fields.len());
                    outcome = Some(enricher.enrich(&request).into());
                }
                Action::Backoff { index, units } => {
                    warn!(
                        field = %fields[index].name,
                        retry = processing.retry_count,
                        backoff_units = units,
                        "retryable enrichment failure; backing off"
                    );
                    let units = u32::try_from(units).unwrap_or(u32::MAX);
                    sleeper.sleep(options.backoff_unit.saturating_mul(units));
                }
                Action::Accept { index, enriched } => {
                    let field = &fields[index];
                    let heuristic = context_for(&mut context, index, field, text_runs, options).heuristic_type;
                    processing
                        .enriched
                        .push(OutputField::from_enriched(field, index, heuristic, enriched));
                }
                Action::Fallback { index } => {
                    let field = &fields[index];
                    warn!(field = %field.name, "enrichment failed; using fallback description");
                    let heuristic = context_for(&mut context, index, field, text_runs, options).heuristic_type;
                    let enriched = EnrichedField::fallback(&field.name, field.radio_group.as_deref());
                    processing
                        .enriched
                        .push(OutputField::from_enriched(field, index, heuristic, enriched));
                    processing.failed_fields.push(field.name.clone());
                }
                Action::Skip { index } => {
                    let field = &fields[index];
                    warn!(
                        field = %field.name,
                        max_retries = options.max_retries,
                        "max retries exceeded; skipping field"
                    );
                    processing.failed_fields.push(field.name.clone());
                }
            }
        }
    }

    info!(
        enriched = processing.enriched.len(),
        failed = processing.failed_fields.len(),
        "finished processing fields"
    );
    processing
}
