//! The enrichment collaborator seam.
//!
//! The processing controller asks a [`FieldEnricher`] for the semantic
//! description of one field at a time. An enricher either returns an
//! [`EnrichedField`] or fails with an [`EnrichError`], which the controller
//! sorts into retryable and non-retryable failures.

use formschema_core::{EnrichedField, FieldType};
use thiserror::Error;

#[cfg(feature = "anthropic")]
pub mod anthropic;
pub mod heuristic;
pub mod prompt;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicEnricher};
pub use heuristic::HeuristicEnricher;

/// Everything an enricher may use to describe one field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRequest<'a> {
    pub field_name: &'a str,
    /// Type after the name and nearby-text heuristics.
    pub heuristic_type: FieldType,
    pub page: usize,
    pub options: &'a [String],
    pub default_value: Option<&'a str>,
    /// Nearby text, best candidate first.
    pub nearby_text: &'a [String],
}

/// A failed enrichment attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrichError {
    /// The service asked the caller to slow down.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The call did not complete in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The reply could not be read as a field description.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),

    /// No API key is configured.
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
}

impl EnrichError {
    /// Whether the same request may succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }
}

/// Produces semantic descriptions of form fields.
pub trait FieldEnricher {
    /// Describe one field.
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError>;

    /// Short name for logging.
    fn name(&self) -> &str;
}

impl<E: FieldEnricher + ?Sized> FieldEnricher for &E {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        (**self).enrich(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: FieldEnricher + ?Sized> FieldEnricher for Box<E> {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        (**self).enrich(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
