//! Plain-text extraction from uploaded documents.

pub mod docx_extractor;

pub use docx_extractor::DocxExtractor;

use crate::errors::ExtractionError;

/// Turns document bytes into plain text.
///
/// Extraction is CPU bound and blocking; callers run it off the async
/// runtime (see `ContextService::upsert`).
pub trait TextExtractor: Send + Sync {
    fn get_name(&self) -> &str;
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}
