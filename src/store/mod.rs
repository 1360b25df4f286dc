pub mod base;
pub mod memory_store;

// Re-export the primary Store items so code outside can do
// "use crate::store::{ContextStore, create_store};"
pub use base::{create_store, ContextStore};
pub use memory_store::MemoryStore;
