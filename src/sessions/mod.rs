pub mod base;
pub mod memory_sessions;

// Re-export the primary items so code outside can do
// "use crate::sessions::{Session, SessionStore};"
pub use base::{Session, SessionStore};
pub use memory_sessions::MemorySessionStore;
