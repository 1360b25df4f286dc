use async_trait::async_trait;

use crate::errors::ContextError;
use crate::models::{ContextRecord, Identity};

/// Produces the summary returned by `/api/ai/process`. This is where a
/// generative-AI backend plugs in.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn get_name(&self) -> &str;
    async fn summarize(
        &self,
        identity: &Identity,
        record: &ContextRecord,
    ) -> Result<String, ContextError>;
}

/// Returns a fixed acknowledgement without calling any model.
#[derive(Default)]
pub struct PlaceholderSummarizer;

#[async_trait]
impl Summarizer for PlaceholderSummarizer {
    fn get_name(&self) -> &str {
        "placeholder"
    }

    async fn summarize(
        &self,
        identity: &Identity,
        _record: &ContextRecord,
    ) -> Result<String, ContextError> {
        Ok(format!("Processed notes for {}", identity.display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_mentions_display_name() {
        let summary = PlaceholderSummarizer
            .summarize(&Identity::new("1", "Grace"), &ContextRecord::default())
            .await
            .unwrap();
        assert_eq!(summary, "Processed notes for Grace");
    }
}
