use serde::{Deserialize, Serialize};

/// The per-identity context saved through `/api/save-context`.
///
/// Fields that were never supplied are omitted from the JSON form, so the
/// default record renders as `{}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docx_text: Option<String>,
}

/// Raw input for an upsert, as submitted by the client.
#[derive(Debug, Clone, Default)]
pub struct ContextSubmission {
    pub notes: Option<String>,
    pub api_key: Option<String>,
    /// Comma separated handles; required.
    pub slack_users_csv: Option<String>,
    /// Bytes of the uploaded `.docx`, if any.
    pub document: Option<Vec<u8>>,
}

/// Splits the handle list on every comma. Segments are kept verbatim:
/// no trimming, empty segments survive.
pub fn split_slack_users(csv: &str) -> Vec<String> {
    csv.split(',').map(str::to_string).collect()
}
