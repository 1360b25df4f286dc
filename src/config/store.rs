use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The context store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema, Default)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Process-local map; everything is lost on restart.
    #[default]
    #[serde(rename = "memory")]
    Memory,
}
