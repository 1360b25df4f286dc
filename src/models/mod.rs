pub mod context;
pub mod identity;

pub use context::{ContextRecord, ContextSubmission};
pub use identity::Identity;
