pub mod google_provider;
pub mod providers;

// Re-export from providers.rs so we can do "use crate::providers::*;"
pub use providers::*;
