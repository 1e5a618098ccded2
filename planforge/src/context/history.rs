//! Append-only exchange history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn in the conversation between collaborator and planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// The speaker ("user" or "assistant").
    pub role: String,
    /// What was said.
    pub content: String,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl Exchange {
    /// Creates an exchange with the current timestamp.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Creates a collaborator exchange.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Creates a planner exchange.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Ordered, append-only log of exchanges.
///
/// There is no API to reorder or edit past entries. [`reset`] exists for the
/// explicit collaborator-facing "start over" affordance and empties the log
/// wholesale; it is the only way entries leave.
///
/// [`reset`]: HistoryLog::reset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(default)]
    exchanges: Vec<Exchange>,
}

impl HistoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exchange at the end.
    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    /// Number of exchanges recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Iterates the exchanges oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// The trailing `n` exchanges, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(n);
        &self.exchanges[start..]
    }

    /// The most recent collaborator message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.exchanges
            .iter()
            .rev()
            .find(|e| e.role == "user")
            .map(|e| e.content.as_str())
    }

    /// Empties the log. Collaborator-facing reset only.
    pub fn reset(&mut self) {
        self.exchanges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = HistoryLog::new();
        log.append(Exchange::user("I want a clearer career direction"));
        log.append(Exchange::assistant("What does your week look like today?"));
        log.append(Exchange::user("Mostly coursework and a part-time job"));

        let roles: Vec<&str> = log.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
    }

    #[test]
    fn test_last_user_message_skips_assistant() {
        let mut log = HistoryLog::new();
        log.append(Exchange::user("first"));
        log.append(Exchange::assistant("a question back"));

        assert_eq!(log.last_user_message(), Some("first"));
    }

    #[test]
    fn test_recent_returns_tail() {
        let mut log = HistoryLog::new();
        for i in 0..5 {
            log.append(Exchange::user(format!("message {i}")));
        }

        let tail = log.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content, "message 3");
        assert_eq!(tail[1].content, "message 4");

        // Asking for more than exists returns everything.
        assert_eq!(log.recent(100).len(), 5);
    }

    #[test]
    fn test_reset_empties_log() {
        let mut log = HistoryLog::new();
        log.append(Exchange::user("anything"));
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log.last_user_message(), None);
    }
}
