//! Research depth tiers with duration and cost estimates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How deep a background research task digs.
///
/// Estimates are expectation-setting figures for callers and budgets, not
/// deadlines: a task overrunning its estimate is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchTier {
    /// Quick lookup, single-source.
    Lite,
    /// Standard multi-source pass.
    #[default]
    Base,
    /// Thorough pass with cross-checking.
    Core,
    /// Deep dive with synthesis.
    Pro,
    /// Exhaustive investigation.
    Ultra,
}

impl ResearchTier {
    /// All tiers, shallowest first.
    pub const ALL: [Self; 5] = [Self::Lite, Self::Base, Self::Core, Self::Pro, Self::Ultra];

    /// Expected wall-clock duration in seconds.
    #[must_use]
    pub fn estimated_seconds(self) -> u64 {
        match self {
            Self::Lite => 30,
            Self::Base => 90,
            Self::Core => 180,
            Self::Pro => 420,
            Self::Ultra => 900,
        }
    }

    /// Expected wall-clock duration.
    #[must_use]
    pub fn estimated_duration(self) -> Duration {
        Duration::from_secs(self.estimated_seconds())
    }

    /// Expected cost in cents.
    #[must_use]
    pub fn estimated_cost_cents(self) -> u32 {
        match self {
            Self::Lite => 5,
            Self::Base => 25,
            Self::Core => 90,
            Self::Pro => 300,
            Self::Ultra => 1500,
        }
    }

    /// Returns the tier name as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lite => "lite",
            Self::Base => "base",
            Self::Core => "core",
            Self::Pro => "pro",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for ResearchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lite_estimate_is_thirty_seconds() {
        assert_eq!(ResearchTier::Lite.estimated_seconds(), 30);
        assert_eq!(
            ResearchTier::Lite.estimated_duration(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_estimates_grow_with_depth() {
        let seconds: Vec<u64> = ResearchTier::ALL
            .iter()
            .map(|t| t.estimated_seconds())
            .collect();
        assert!(seconds.windows(2).all(|pair| pair[0] < pair[1]));

        let costs: Vec<u32> = ResearchTier::ALL
            .iter()
            .map(|t| t.estimated_cost_cents())
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ResearchTier::Lite).unwrap(),
            serde_json::json!("lite")
        );
        let tier: ResearchTier = serde_json::from_value(serde_json::json!("ultra")).unwrap();
        assert_eq!(tier, ResearchTier::Ultra);
    }
}
