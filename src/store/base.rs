use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::memory_store::MemoryStore;
use crate::config::StoreConfig;
use crate::models::ContextRecord;

/// The ContextStore trait abstracts per-identity context storage.
///
/// Implementations hold at most one record per identity id and replace it
/// wholesale on upsert.
#[async_trait]
pub trait ContextStore: Send + Sync {
    fn get_name(&self) -> &str;
    async fn upsert(&self, identity_id: &str, record: ContextRecord) -> Result<(), String>;
    async fn lookup(&self, identity_id: &str) -> Result<Option<ContextRecord>, String>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn ContextStore> {
    match config {
        StoreConfig::Memory => {
            info!("Using in-memory context store; records are lost on restart.");
            Arc::new(MemoryStore::new())
        }
    }
}
