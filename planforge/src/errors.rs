//! Error taxonomy for the planforge pipeline and scheduler.
//!
//! Failures fall into four families: synchronous validation errors,
//! transient-or-fatal faults from external providers and agents, pipeline
//! errors surfaced to the caller, and scheduler errors raised at task
//! creation. A gate that is not met is not an error and never appears here;
//! it is reported through [`crate::pipeline::PassStatus`].

use crate::context::StageName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A synchronous, field-level validation failure.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("validation failed for '{field}': {message}")]
pub struct ValidationError {
    /// The offending field or parameter.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Classifies an error as worth retrying or not.
pub trait Retryable {
    /// Returns true if a retry may succeed.
    fn is_retryable(&self) -> bool;
}

/// A fault raised by an external provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderFault {
    /// A temporary condition such as a timeout or rate limit.
    #[error("transient provider fault: {reason}")]
    Transient {
        /// Human-readable cause.
        reason: String,
    },

    /// An unrecoverable condition such as rejected credentials.
    #[error("fatal provider fault: {reason}")]
    Fatal {
        /// Human-readable cause.
        reason: String,
    },
}

impl ProviderFault {
    /// Creates a transient fault.
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Creates a fatal fault.
    #[must_use]
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns true for the transient variant.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl Retryable for ProviderFault {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// A fault raised while a stage agent was computing its report.
///
/// Distinct from a gate that is not met: a gated stage produced a valid
/// report, a faulted stage produced nothing.
#[derive(Debug, Clone, Error)]
pub enum AgentFault {
    /// Worth retrying with backoff.
    #[error("transient agent fault: {reason}")]
    Transient {
        /// Human-readable cause.
        reason: String,
    },

    /// Retrying will not help.
    #[error("fatal agent fault: {reason}")]
    Fatal {
        /// Human-readable cause.
        reason: String,
    },
}

impl AgentFault {
    /// Creates a transient fault.
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Creates a fatal fault.
    #[must_use]
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns true for the transient variant.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl Retryable for AgentFault {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

impl From<ProviderFault> for AgentFault {
    fn from(fault: ProviderFault) -> Self {
        match fault {
            ProviderFault::Transient { reason } => Self::Transient { reason },
            ProviderFault::Fatal { reason } => Self::Fatal { reason },
        }
    }
}

/// Errors surfaced by a pipeline pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input or report validation failed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A stage agent faulted and the stage fault policy aborted the pass.
    #[error("stage '{stage}' failed: {fault}")]
    StageFailed {
        /// The stage whose agent faulted.
        stage: StageName,
        /// The underlying fault after retries were exhausted.
        fault: AgentFault,
    },
}

/// Errors raised while creating or inspecting background tasks.
///
/// Faults during task execution never appear here; they are captured in
/// the task's terminal error state and observed via status polling.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The task request failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The scheduler has shut down and no longer accepts tasks.
    #[error("task queue is closed")]
    QueueClosed,
}

/// Errors raised by a context store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The context could not be serialized or deserialized.
    #[error("store serialization error: {0}")]
    Serialization(String),

    /// The backing store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Severity attached to a caller-facing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Degraded but usable.
    Warn,
    /// The operation did not complete.
    Error,
}

/// A generic, caller-facing rendering of an internal failure.
///
/// Internal detail stays in the log; the caller receives a message safe to
/// show plus suggestions for what to do next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerReport {
    /// Message safe to display.
    pub message: String,
    /// How bad it is.
    pub severity: Severity,
    /// Suggested next steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl CallerReport {
    /// Creates a report with no suggestions.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            suggestions: Vec::new(),
        }
    }

    /// Adds a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl From<&PipelineError> for CallerReport {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Validation(v) => {
                Self::new(v.to_string(), Severity::Error)
                    .with_suggestion(format!("Correct the '{}' field and resubmit.", v.field))
            }
            PipelineError::StageFailed { .. } => {
                Self::new("We hit a snag while working on your plan.", Severity::Error)
                    .with_suggestion("Try again in a moment.")
            }
        }
    }
}

impl From<&SchedulerError> for CallerReport {
    fn from(err: &SchedulerError) -> Self {
        match err {
            SchedulerError::Validation(v) => {
                Self::new(v.to_string(), Severity::Error)
                    .with_suggestion(format!("Correct the '{}' field and resubmit.", v.field))
            }
            SchedulerError::QueueClosed => {
                Self::new("Background research is currently unavailable.", Severity::Warn)
                    .with_suggestion("Your plan is unaffected; retry the research later.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("subject_id", "must not be empty");
        assert_eq!(
            err.to_string(),
            "validation failed for 'subject_id': must not be empty"
        );
    }

    #[test]
    fn test_provider_fault_classification() {
        assert!(ProviderFault::transient("timeout").is_transient());
        assert!(!ProviderFault::fatal("bad credentials").is_transient());
        assert!(ProviderFault::transient("timeout").is_retryable());
    }

    #[test]
    fn test_agent_fault_from_provider_fault() {
        let fault: AgentFault = ProviderFault::transient("rate limited").into();
        assert!(fault.is_transient());

        let fault: AgentFault = ProviderFault::fatal("rejected").into();
        assert!(!fault.is_retryable());
    }

    #[test]
    fn test_pipeline_error_wraps_validation() {
        let err: PipelineError = ValidationError::new("confidence", "out of range").into();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn test_caller_report_hides_stage_detail() {
        let err = PipelineError::StageFailed {
            stage: StageName::Discovery,
            fault: AgentFault::fatal("schema drift in provider output"),
        };
        let report = CallerReport::from(&err);

        assert_eq!(report.severity, Severity::Error);
        assert!(!report.message.contains("schema drift"));
        assert!(!report.suggestions.is_empty());
    }

    #[test]
    fn test_caller_report_exposes_validation_detail() {
        let err: SchedulerError = ValidationError::new("query", "must not be empty").into();
        let report = CallerReport::from(&err);
        assert!(report.message.contains("query"));
    }
}
