use std::fmt;
use std::time::Duration;

use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AuthError;
use crate::models::Identity;
use crate::providers::{CallbackParams, IdentityProvider};

/// Config for Google's OAuth 2.0 / OpenID Connect endpoints.
#[derive(Deserialize, Serialize, JsonSchema, Clone)]
#[serde(default)]
pub struct GoogleProviderConfig {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    /// Externally visible base URL of this service; the redirect URI is
    /// `public_url` + `callback_path`.
    pub public_url: String,
    pub callback_path: String,
    pub scopes: Vec<String>,
    pub auth_uri: String,
    pub token_uri: String,
    pub userinfo_uri: String,
    pub timeout_in_ms: u64,
}

impl Default for GoogleProviderConfig {
    fn default() -> Self {
        GoogleProviderConfig {
            name: "google".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            public_url: "http://localhost:3000".to_string(),
            callback_path: "/auth/google/callback".to_string(),
            scopes: vec!["profile".to_string(), "email".to_string()],
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_uri: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            timeout_in_ms: 5_000,
        }
    }
}

// Keeps the client secret out of logs.
impl fmt::Debug for GoogleProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleProviderConfig")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("public_url", &self.public_url)
            .field("callback_path", &self.callback_path)
            .field("scopes", &self.scopes)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("userinfo_uri", &self.userinfo_uri)
            .field("timeout_in_ms", &self.timeout_in_ms)
            .finish()
    }
}

impl GoogleProviderConfig {
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}{}",
            self.public_url.trim_end_matches('/'),
            self.callback_path
        )
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

/// Identity provider backed by Google's authorization-code flow.
pub struct GoogleProvider {
    config: GoogleProviderConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: &GoogleProviderConfig) -> Self {
        info!(
            "Creating Google identity provider '{}' with redirect URI '{}'",
            config.name,
            config.redirect_uri()
        );
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            warn!("Google client id or secret is not configured; logins will fail");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({}); using defaults", e);
                reqwest::Client::new()
            });

        Self {
            config: config.clone(),
            client,
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let redirect_uri = self.config.redirect_uri();
        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let resp = self
            .client
            .post(&self.config.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("Failed to call token endpoint: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AuthError::Exchange(format!(
                "Token endpoint returned {}",
                resp.status()
            )));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Exchange(format!("Failed to parse token JSON: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let resp = self
            .client
            .get(&self.config.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Profile(format!("Failed to call userinfo endpoint: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AuthError::Profile(format!(
                "Userinfo endpoint returned {}",
                resp.status()
            )));
        }

        resp.json::<UserInfo>()
            .await
            .map_err(|e| AuthError::Profile(format!("Failed to parse userinfo JSON: {}", e)))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "google"
    }

    fn initiate(&self, state: &str) -> Result<Url, AuthError> {
        if self.config.client_id.is_empty() {
            return Err(AuthError::Config("client_id is not set".to_string()));
        }
        Url::parse_with_params(
            &self.config.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri().as_str()),
                ("scope", self.config.scopes.join(" ").as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::Config(format!("Invalid auth_uri: {}", e)))
    }

    /// Exchanges the authorization code for an access token, then reads the
    /// user's profile with it.
    async fn complete(&self, callback: &CallbackParams) -> Result<Identity, AuthError> {
        if let Some(error) = &callback.error {
            return Err(AuthError::Denied(error.clone()));
        }
        let code = callback
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        let access_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&access_token).await?;
        debug!("Fetched Google profile for sub='{}'", profile.sub);

        let display_name = profile
            .name
            .clone()
            .or_else(|| profile.email.clone())
            .unwrap_or_else(|| profile.sub.clone());
        let identity = Identity::new(profile.sub, display_name);
        Ok(match profile.email {
            Some(email) => identity.with_email(email),
            None => identity,
        })
    }
}
