//! Testing utilities for planforge pipelines.
//!
//! This module provides:
//! - Scripted completion and research providers
//! - Scripted stage agents
//! - Fixtures for contexts, reports, and proposals

pub mod fixtures;
mod mocks;

pub use mocks::{ScriptedAgent, ScriptedCompletionProvider, StubResearchProvider};
