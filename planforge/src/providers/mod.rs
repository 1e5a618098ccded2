//! External collaborator seams: completion, research, and persistence.
//!
//! All domain judgment lives behind these traits. The crate ships no HTTP
//! client; embedders supply implementations, and [`MemoryContextStore`]
//! covers tests and single-process deployments.

mod memory;

pub use memory::MemoryContextStore;

use crate::context::SessionContext;
use crate::errors::{ProviderFault, StoreError};
use crate::scheduler::ResearchTier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completion backend that fills a JSON schema from a prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produces a structured completion conforming to `schema`.
    async fn complete(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<StructuredCompletion, ProviderFault>;
}

/// A structured reply from a completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredCompletion {
    /// The schema-conforming value.
    pub value: serde_json::Value,
    /// Which model produced it.
    pub model: String,
    /// Round-trip latency, if measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Metered cost, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<f64>,
}

impl StructuredCompletion {
    /// Creates a completion with no latency or cost metadata.
    #[must_use]
    pub fn new(value: serde_json::Value, model: impl Into<String>) -> Self {
        Self {
            value,
            model: model.into(),
            latency_ms: None,
            cost_cents: None,
        }
    }

    /// Sets the measured latency.
    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Sets the metered cost.
    #[must_use]
    pub fn with_cost_cents(mut self, cost_cents: f64) -> Self {
        self.cost_cents = Some(cost_cents);
        self
    }
}

/// A research backend executing one tiered investigation.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Runs the query at the given depth.
    async fn run(&self, query: &str, tier: ResearchTier)
        -> Result<ResearchFindings, ProviderFault>;
}

/// What a research run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchFindings {
    /// Synthesized answer.
    pub summary: String,
    /// Sources backing the summary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// Provider-specific payload, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl ResearchFindings {
    /// Creates findings with just a summary.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            sources: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    /// Adds a source.
    #[must_use]
    pub fn with_source(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.sources.push(SourceRef {
            title: title.into(),
            url: url.into(),
        });
        self
    }
}

/// A cited source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source title.
    pub title: String,
    /// Source location.
    pub url: String,
}

/// Durable storage for session contexts.
///
/// The pipeline never persists; the caller saves between passes. `save`
/// assigns the context its set-once identity on first call.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Persists the context, assigning an id if it has none.
    async fn save(&self, ctx: &mut SessionContext) -> Result<Uuid, StoreError>;

    /// Loads a context by id.
    async fn load(&self, id: Uuid) -> Result<Option<SessionContext>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_completion_builder() {
        let completion = StructuredCompletion::new(serde_json::json!({"ready": true}), "test-model")
            .with_latency_ms(12.5)
            .with_cost_cents(0.3);

        assert_eq!(completion.model, "test-model");
        assert_eq!(completion.latency_ms, Some(12.5));
        assert_eq!(completion.value["ready"], true);
    }

    #[test]
    fn test_findings_skip_null_raw_on_wire() {
        let findings = ResearchFindings::new("two strong program matches")
            .with_source("University guide", "https://example.org/guide");

        let json = serde_json::to_value(&findings).unwrap();
        assert!(json.get("raw").is_none());
        assert_eq!(json["sources"][0]["title"], "University guide");
    }
}
