//! Spawn policy: the pure gate between research proposals and the scheduler.
//!
//! Horizon decides: strategic items always spawn, execution items never do,
//! and tactical items spawn only when their title matches the configured
//! keyword allow-list. The policy holds no handles and performs no IO, so a
//! decision is reproducible from the proposal alone.

use crate::agents::ResearchProposal;
use crate::context::Horizon;
use crate::errors::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for [`SpawnPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Keywords that qualify a tactical proposal, matched case-insensitively
    /// on word boundaries within the proposal title.
    pub tactical_keywords: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tactical_keywords: vec!["university".to_string(), "career".to_string()],
        }
    }
}

/// Decides which research proposals are worth scheduling.
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl SpawnPolicy {
    /// Builds a policy from configuration, compiling the keyword matchers.
    pub fn new(config: PolicyConfig) -> Result<Self, ValidationError> {
        let mut patterns = Vec::with_capacity(config.tactical_keywords.len());
        for keyword in &config.tactical_keywords {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
            let regex = Regex::new(&pattern).map_err(|e| {
                ValidationError::new(
                    "tactical_keywords",
                    format!("keyword {keyword:?} does not compile: {e}"),
                )
            })?;
            patterns.push(regex);
        }
        Ok(Self {
            keywords: config.tactical_keywords,
            patterns,
        })
    }

    /// Builds a policy straight from a keyword list.
    pub fn with_keywords<I, S>(keywords: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(PolicyConfig {
            tactical_keywords: keywords.into_iter().map(Into::into).collect(),
        })
    }

    /// The configured keyword allow-list.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns whether the proposal should be handed to the scheduler.
    #[must_use]
    pub fn should_spawn(&self, proposal: &ResearchProposal) -> bool {
        match proposal.horizon {
            Horizon::Strategic => true,
            Horizon::Execution => false,
            Horizon::Tactical => self
                .patterns
                .iter()
                .any(|pattern| pattern.is_match(&proposal.title)),
        }
    }

    /// Splits proposals into approved ones and a rejected count.
    #[must_use]
    pub fn filter(&self, proposals: Vec<ResearchProposal>) -> (Vec<ResearchProposal>, usize) {
        let total = proposals.len();
        let approved: Vec<ResearchProposal> = proposals
            .into_iter()
            .filter(|proposal| {
                let spawn = self.should_spawn(proposal);
                if !spawn {
                    debug!(
                        subject_id = %proposal.subject_id,
                        title = %proposal.title,
                        horizon = %proposal.horizon,
                        "proposal rejected by spawn policy"
                    );
                }
                spawn
            })
            .collect();
        let rejected = total - approved.len();
        (approved, rejected)
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default()).expect("default keywords compile")
    }
}
