use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::ContextStore;
use crate::models::ContextRecord;

/// Context records in a sharded concurrent map. Each write replaces the
/// whole entry under its shard lock, so readers never see a partial record.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, ContextRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, identity_id: &str, record: ContextRecord) -> Result<(), String> {
        let replaced = self
            .records
            .insert(identity_id.to_string(), record)
            .is_some();
        debug!(replaced, "Stored context record");
        Ok(())
    }

    async fn lookup(&self, identity_id: &str) -> Result<Option<ContextRecord>, String> {
        Ok(self
            .records
            .get(identity_id)
            .map(|entry| entry.value().clone()))
    }
}
