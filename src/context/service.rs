use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::summarizer::Summarizer;
use crate::errors::{ContextError, ExtractionError};
use crate::extract::TextExtractor;
use crate::models::context::split_slack_users;
use crate::models::{ContextRecord, ContextSubmission, Identity};
use crate::store::ContextStore;

/// Upsert, lookup and process operations over the context store.
pub struct ContextService {
    store: Arc<dyn ContextStore>,
    extractor: Arc<dyn TextExtractor>,
    summarizer: Arc<dyn Summarizer>,
    extraction_timeout: Duration,
}

impl ContextService {
    pub fn new(
        store: Arc<dyn ContextStore>,
        extractor: Arc<dyn TextExtractor>,
        summarizer: Arc<dyn Summarizer>,
        extraction_timeout: Duration,
    ) -> Self {
        info!(
            "Creating context service: store='{}', extractor='{}', summarizer='{}'",
            store.get_name(),
            extractor.get_name(),
            summarizer.get_name()
        );
        ContextService {
            store,
            extractor,
            summarizer,
            extraction_timeout,
        }
    }

    /// Validates the submission, extracts document text and replaces the
    /// identity's record. Nothing is written unless every step succeeds.
    pub async fn upsert(
        &self,
        identity: &Identity,
        submission: ContextSubmission,
    ) -> Result<ContextRecord, ContextError> {
        let csv = submission
            .slack_users_csv
            .ok_or_else(|| ContextError::Validation("slackUsers is required".to_string()))?;
        let slack_users = split_slack_users(&csv);

        let docx_text = match submission.document {
            Some(bytes) => self.extract_text(bytes).await?,
            None => String::new(),
        };

        let record = ContextRecord {
            notes: submission.notes,
            api_key: submission.api_key,
            slack_users: Some(slack_users),
            docx_text: Some(docx_text),
        };
        self.store
            .upsert(&identity.id, record.clone())
            .await
            .map_err(ContextError::Store)?;

        info!(
            user = %identity.id,
            slack_users = record.slack_users.as_ref().map_or(0, Vec::len),
            docx_chars = record.docx_text.as_ref().map_or(0, |t| t.chars().count()),
            "Saved context"
        );
        Ok(record)
    }

    /// Returns the stored record, or the empty default when there is none.
    pub async fn lookup(&self, identity: &Identity) -> Result<ContextRecord, ContextError> {
        let record = self
            .store
            .lookup(&identity.id)
            .await
            .map_err(ContextError::Store)?;
        Ok(record.unwrap_or_default())
    }

    /// Summarizes the stored context; fails with `NotFound` before the first upsert.
    pub async fn process(&self, identity: &Identity) -> Result<String, ContextError> {
        let record = self
            .store
            .lookup(&identity.id)
            .await
            .map_err(ContextError::Store)?
            .ok_or(ContextError::NotFound)?;
        debug!(user = %identity.id, "Processing stored context");
        self.summarizer.summarize(identity, &record).await
    }

    /// Runs the extractor on the blocking pool, bounded by the configured timeout.
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let extractor = self.extractor.clone();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&bytes));

        match timeout(self.extraction_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ExtractionError::Worker(join_error.to_string())),
            Err(_) => {
                let millis =
                    u64::try_from(self.extraction_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("Document extraction timed out after {} ms", millis);
                Err(ExtractionError::Timeout(millis))
            }
        }
    }
}
