//! Authentication configuration.

use crate::{ConfigError, ConfigResult, MissingSetting};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Upper bound on how long a host token request may stay unanswered.
pub const DEFAULT_HOST_TOKEN_TIMEOUT_SECS: u64 = 30;

const ENV_APPLICATION_ID: &str = "TEAMS_SSO_APPLICATION_ID";
const ENV_RESOURCE_URI: &str = "TEAMS_SSO_RESOURCE_URI";
const ENV_SCOPES: &str = "TEAMS_SSO_SCOPES";
const ENV_REDIRECT_URI: &str = "TEAMS_SSO_REDIRECT_URI";
const ENV_AUTO_LOGIN: &str = "TEAMS_SSO_AUTO_LOGIN";

/// Settings supplied by the embedding application.
///
/// Immutable for the lifetime of an orchestrator. Cross-field requirements
/// (scopes need an application id, interactive fallback needs a redirect
/// uri) are checked by the `require_*` accessors when a login branch needs
/// them, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Registered application (client) id.
    #[serde(default)]
    pub application_id: Option<String>,
    /// Protected resource for host-issued tokens.
    #[serde(default)]
    pub resource_uri: String,
    /// Delegated permission scopes. Presence switches on the provider exchange.
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    /// Redirect target for interactive sign-in.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Hand a token supplier to the identity bridge integration.
    #[serde(default)]
    pub use_identity_bridge: bool,
    /// Start a login as soon as the host context is known.
    #[serde(default = "default_auto_login")]
    pub auto_login: bool,
    /// Host token request timeout in seconds.
    #[serde(default = "default_host_token_timeout_secs")]
    pub host_token_timeout_secs: u64,
}

fn default_auto_login() -> bool {
    true
}

fn default_host_token_timeout_secs() -> u64 {
    DEFAULT_HOST_TOKEN_TIMEOUT_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            application_id: None,
            resource_uri: String::new(),
            scopes: None,
            redirect_uri: None,
            use_identity_bridge: false,
            auto_login: default_auto_login(),
            host_token_timeout_secs: DEFAULT_HOST_TOKEN_TIMEOUT_SECS,
        }
    }
}

impl AuthConfig {
    /// Config for host-issued tokens only.
    pub fn for_resource(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            ..Self::default()
        }
    }

    /// Load from an optional file, falling back to defaults, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::default(),
        };
        config.load_from_env()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuthConfig = serde_json::from_str(&content)?;
        Ok(config.normalized())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from `TEAMS_SSO_*` environment variables.
    pub fn load_from_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        let lookup = |name: &str| lookup(name).and_then(non_empty);

        if let Some(id) = lookup(ENV_APPLICATION_ID) {
            self.application_id = Some(id);
        }
        if let Some(resource) = lookup(ENV_RESOURCE_URI) {
            self.resource_uri = resource;
        }
        if let Some(raw) = lookup(ENV_SCOPES) {
            self.scopes = Some(parse_scopes(&raw));
        }
        if let Some(redirect) = lookup(ENV_REDIRECT_URI) {
            self.redirect_uri = Some(redirect);
        }
        if let Some(raw) = lookup(ENV_AUTO_LOGIN) {
            self.auto_login = parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "auto_login",
                reason: format!("expected true or false, got {raw:?}"),
            })?;
        }

        *self = std::mem::take(self).normalized();
        Ok(())
    }

    /// Empty scope lists mean "not configured".
    fn normalized(mut self) -> Self {
        if let Some(scopes) = self.scopes.take() {
            let scopes: Vec<String> = scopes
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !scopes.is_empty() {
                self.scopes = Some(scopes);
            }
        }
        self
    }

    /// Scopes when delegated-permission mode is on.
    pub fn delegated_scopes(&self) -> Option<&[String]> {
        self.scopes.as_deref().filter(|s| !s.is_empty())
    }

    pub fn require_application_id(&self) -> Result<&str, MissingSetting> {
        self.application_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(MissingSetting::ApplicationId)
    }

    pub fn require_scopes(&self) -> Result<&[String], MissingSetting> {
        self.delegated_scopes().ok_or(MissingSetting::Scopes)
    }

    pub fn require_redirect_uri(&self) -> Result<&str, MissingSetting> {
        self.redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or(MissingSetting::RedirectUri)
    }

    /// Parse the redirect uri, if one is set.
    pub fn redirect_url(&self) -> ConfigResult<Option<Url>> {
        self.redirect_uri
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn host_token_timeout(&self) -> Duration {
        Duration::from_secs(self.host_token_timeout_secs)
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
