//! TOML-based application configuration.
//!
//! Stores:
//! - Integrations backend location
//! - OAuth redirect URI
//! - One OAuth client id per provider
//!
//! Configuration is stored at `~/.config/bassist/config.toml`. Environment
//! variables (`BASSIST_<PROVIDER>_CLIENT_ID`, `BASSIST_BACKEND_URL`,
//! `BASSIST_OAUTH_REDIRECT_URI`) override file values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::providers::ProviderId;

const CLIENT_IDS_PATH: &str = "oauth.client_ids";

/// Integrations backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// OAuth application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Provider id -> OAuth client id.
    #[serde(default)]
    pub client_ids: BTreeMap<String, String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/bassist/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

fn default_backend_url() -> String {
    "http://localhost:8000/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_redirect_uri() -> String {
    "http://localhost:3000/oauth-callback".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_uri: default_redirect_uri(),
            client_ids: BTreeMap::new(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::MissingKey(key.to_string());
        let (parent_path, leaf) = key.rsplit_once('.').unwrap_or(("", key));
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = &mut *root;
        if !parent_path.is_empty() {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;

        // Client ids live in an open map keyed by provider id.
        if parent_path == CLIENT_IDS_PATH {
            leaf.parse::<ProviderId>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            obj.insert(leaf.to_string(), serde_json::Value::String(value.into()));
            return Ok(());
        }

        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let existing = obj.get(leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/bassist"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, apply environment overrides.
    ///
    /// The result is for reading only; persist changes from [`Config::load_file`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load the file values from the default location, without environment
    /// overrides.
    pub fn load_file() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Overlay environment variables onto the loaded file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("BASSIST_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(uri) = non_empty("BASSIST_OAUTH_REDIRECT_URI") {
            self.oauth.redirect_uri = uri;
        }
        for provider in ProviderId::ALL {
            if let Some(client_id) = non_empty(&provider.client_id_env()) {
                self.oauth
                    .client_ids
                    .insert(provider.as_str().to_string(), client_id);
            }
        }
    }

    /// Client id configured for `provider`, ignoring blank values.
    pub fn client_id(&self, provider: ProviderId) -> Option<&str> {
        self.oauth
            .client_ids
            .get(provider.as_str())
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(())
    }
}
