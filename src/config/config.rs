use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::extract::docx_extractor::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::providers::ProviderConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CONTEXTRON_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0. Every section has defaults so the service can
/// start from environment variables alone.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
#[serde(default)]
pub struct ConfigV1 {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub session: SessionConfig,
    pub store: StoreConfig,
    pub extraction: ExtractionConfig,
}

impl ConfigV1 {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Builds the layered figment: defaults, then the YAML file, then
/// `CONTEXTRON_*` variables, then the legacy unprefixed variables.
pub fn figment(path: &str) -> Figment {
    Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
        .merge(Yaml::file(path))
        .merge(Env::prefixed("CONTEXTRON_").ignore(&["config"]).split("__"))
        .merge(Env::raw().filter_map(|key| {
            match key.as_str().to_ascii_uppercase().as_str() {
                "GOOGLE_CLIENT_ID" => Some("provider.client_id".into()),
                "GOOGLE_CLIENT_SECRET" => Some("provider.client_secret".into()),
                "PORT" => Some("server.port".into()),
                _ => None,
            }
        }))
}

/// Extracts a `ConfigV1` from a figment, migrating older versions if needed.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from `config.yaml` (or `$CONTEXTRON_CONFIG`) and the environment.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match extract_config(&figment(&path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to render schema: {}", e),
    }
}

/// Where the HTTP listener binds.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Session cookie settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_in_seconds: i64,
    /// Adds the `Secure` attribute; enable when served over HTTPS.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            cookie_name: "contextron.sid".to_string(),
            ttl_in_seconds: 86_400,
            secure: false,
        }
    }
}

/// Limits for uploaded documents.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ExtractionConfig {
    pub timeout_in_ms: u64,
    /// Request body limit, i.e. the compressed document plus the form fields.
    pub max_upload_bytes: usize,
    /// Limit on the inflated document body.
    pub max_document_bytes: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            timeout_in_ms: 10_000,
            max_upload_bytes: 10 * 1024 * 1024,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}
