use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{DEFAULT_SCOPE, HYDRA_ENDPOINT};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth client id of the Webex integration
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret of the Webex integration
    #[serde(default)]
    pub client_secret: String,
    /// Space-separated list of requested permissions
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Redirect URI registered for the integration
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Single sign-on settings, used by `auth login --sso`
    #[serde(default)]
    pub sso: Option<SsoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SsoConfig {
    /// Webex email address of the SSO user
    #[serde(default)]
    pub email: String,
    /// Identity provider that validates the claim on behalf of the application
    pub identity_provider_uri: String,
    /// Extra query items appended to the identity provider URI
    #[serde(default)]
    pub query_items: BTreeMap<String, String>,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8976/callback".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            scope: default_scope(),
            redirect_uri: default_redirect_uri(),
            sso: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Hydra (public REST API) base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_base_url() -> String {
    HYDRA_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    /// Get the project directories
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "webex-cli", "webex-cli")
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs().context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a file, falling back to defaults when it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_hydra() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://webexapis.com/v1");
        assert_eq!(config.api.timeout, 30);
        assert_eq!(config.auth.scope, "spark:all");
        assert!(config.auth.sso.is_none());
    }

    #[test]
    fn parses_sso_section() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            client_id = "C123"
            client_secret = "secret"

            [auth.sso]
            email = "jane@example.com"
            identity_provider_uri = "https://idp.example.com/sso"

            [auth.sso.query_items]
            tenant = "acme"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.client_id, "C123");
        assert_eq!(config.auth.redirect_uri, "http://127.0.0.1:8976/callback");
        let sso = config.auth.sso.unwrap();
        assert_eq!(sso.email, "jane@example.com");
        assert_eq!(sso.query_items.get("tenant").map(String::as_str), Some("acme"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.base_url, HYDRA_ENDPOINT);
    }
}
