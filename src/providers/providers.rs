use super::google_provider::{GoogleProvider, GoogleProviderConfig};
use crate::errors::AuthError;
use crate::models::Identity;
use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration options for the identity provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "google")]
    Google(GoogleProviderConfig),
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Google(GoogleProviderConfig::default())
    }
}

/// Query parameters the provider sends back to the callback route.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// An identity provider drives the two halves of an authorization-code login.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    /// Builds the URL the browser is redirected to, carrying `state`.
    fn initiate(&self, state: &str) -> Result<Url, AuthError>;
    /// Turns the callback parameters into an authenticated identity.
    async fn complete(&self, callback: &CallbackParams) -> Result<Identity, AuthError>;
}

/// Create an identity provider from a given config.
pub fn create_identity_provider(config: &ProviderConfig) -> Box<dyn IdentityProvider> {
    let provider: Box<dyn IdentityProvider> = match config {
        ProviderConfig::Google(cfg) => Box::new(GoogleProvider::new(cfg)),
    };
    info!(
        "Using identity provider '{}' of type '{}'",
        provider.get_name(),
        provider.get_type()
    );
    provider
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_creates_google_provider() {
        let provider = create_identity_provider(&ProviderConfig::default());
        assert_eq!(provider.get_type(), "google");
        assert_eq!(provider.get_name(), "google");
    }
}
