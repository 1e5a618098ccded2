//! In-memory context store for tests and single-process embedding.

use super::ContextStore;
use crate::context::SessionContext;
use crate::errors::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// A context store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    entries: RwLock<HashMap<Uuid, SessionContext>>,
}

impl MemoryContextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn save(&self, ctx: &mut SessionContext) -> Result<Uuid, StoreError> {
        let id = match ctx.id() {
            Some(existing) => existing,
            None => {
                let fresh = Uuid::new_v4();
                ctx.assign_id(fresh)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                debug!(session_id = %fresh, "assigned session id");
                fresh
            }
        };

        self.entries.write().insert(id, ctx.clone());
        Ok(id)
    }

    async fn load(&self, id: Uuid) -> Result<Option<SessionContext>, StoreError> {
        Ok(self.entries.read().get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SessionSeed;

    #[tokio::test]
    async fn test_save_assigns_id_once() {
        let store = MemoryContextStore::new();
        let mut ctx = SessionContext::new(SessionSeed::new("save me"));

        let first = store.save(&mut ctx).await.unwrap();
        assert_eq!(ctx.id(), Some(first));

        // A later save reuses the assigned id.
        let second = store.save(&mut ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let store = MemoryContextStore::new();
        let mut ctx = SessionContext::new(SessionSeed::new("round trip"));
        let id = store.save(&mut ctx).await.unwrap();

        let loaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(loaded.seed().opening_message, "round trip");

        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }
}
