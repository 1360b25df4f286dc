pub mod service;
pub mod summarizer;

pub use service::ContextService;
pub use summarizer::{PlaceholderSummarizer, Summarizer};
