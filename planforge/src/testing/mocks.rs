//! Scripted providers and agents.

use crate::agents::{Agent, StageReport};
use crate::context::{SessionContext, StageName};
use crate::errors::{AgentFault, ProviderFault};
use crate::providers::{
    CompletionProvider, ResearchFindings, ResearchProvider, StructuredCompletion,
};
use crate::scheduler::ResearchTier;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// A completion provider that replays a scripted sequence of replies.
///
/// An exhausted script returns a fatal fault, so a test that under-scripts
/// fails loudly instead of hanging on a default.
#[derive(Debug, Default)]
pub struct ScriptedCompletionProvider {
    replies: Mutex<VecDeque<Result<StructuredCompletion, ProviderFault>>>,
    calls: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletionProvider {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply.
    pub fn push_value(&self, value: serde_json::Value) {
        self.replies
            .lock()
            .push_back(Ok(StructuredCompletion::new(value, "scripted-model")));
    }

    /// Queues a fault.
    pub fn push_fault(&self, fault: ProviderFault) {
        self.replies.lock().push_back(Err(fault));
    }

    /// Number of completions requested so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Every prompt received, in call order.
    #[must_use]
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletionProvider {
    async fn complete(
        &self,
        prompt: &str,
        _schema: &serde_json::Value,
    ) -> Result<StructuredCompletion, ProviderFault> {
        *self.calls.lock() += 1;
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderFault::fatal("completion script exhausted")))
    }
}

/// A stage agent that replays scripted reports.
#[derive(Debug)]
pub struct ScriptedAgent {
    stage: StageName,
    reports: Mutex<VecDeque<Result<StageReport, AgentFault>>>,
    calls: Mutex<usize>,
}

impl ScriptedAgent {
    /// Creates an agent for the given stage with an empty script.
    #[must_use]
    pub fn new(stage: StageName) -> Self {
        Self {
            stage,
            reports: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
        }
    }

    /// Queues a report.
    pub fn push_report(&self, report: StageReport) {
        self.reports.lock().push_back(Ok(report));
    }

    /// Queues a fault.
    pub fn push_fault(&self, fault: AgentFault) {
        self.reports.lock().push_back(Err(fault));
    }

    /// Number of evaluations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn stage(&self) -> StageName {
        self.stage
    }

    async fn evaluate(
        &self,
        _ctx: &SessionContext,
        _input: Option<&str>,
    ) -> Result<StageReport, AgentFault> {
        *self.calls.lock() += 1;
        self.reports
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AgentFault::fatal("agent script exhausted")))
    }
}

/// A research provider with a fixed outcome and optional artificial delay.
#[derive(Debug)]
pub struct StubResearchProvider {
    findings: ResearchFindings,
    fault: Option<ProviderFault>,
    delay: Option<Duration>,
    calls: Mutex<usize>,
    queries: Mutex<Vec<String>>,
}

impl StubResearchProvider {
    /// Always succeeds with the given summary.
    #[must_use]
    pub fn ok(summary: impl Into<String>) -> Self {
        Self {
            findings: ResearchFindings::new(summary),
            fault: None,
            delay: None,
            calls: Mutex::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with the given fault.
    #[must_use]
    pub fn failing(fault: ProviderFault) -> Self {
        Self {
            findings: ResearchFindings::new("unused"),
            fault: Some(fault),
            delay: None,
            calls: Mutex::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Adds an artificial delay before each response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of research runs so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Every query received, in call order.
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl ResearchProvider for StubResearchProvider {
    async fn run(
        &self,
        query: &str,
        _tier: ResearchTier,
    ) -> Result<ResearchFindings, ProviderFault> {
        *self.calls.lock() += 1;
        self.queries.lock().push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(self.findings.clone()),
        }
    }
}
