//! Client configuration.
//!
//! `ClientConfig` tells the CLI (and any other host) where the capture
//! backend lives and how aggressively to poll it. Values are layered:
//! defaults, then an optional JSON file, then `CLIPTRAY_*` environment
//! variables, then whatever the host overrides explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_NOTICE_TTL_MS: u64 = 2_000;
pub const DEFAULT_MAX_NOTICES: usize = 2;

const CONFIG_DIR_NAME: &str = "cliptray";
const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_BACKEND_URL: &str = "CLIPTRAY_BACKEND_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "CLIPTRAY_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "CLIPTRAY_REQUEST_TIMEOUT_MS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub notice_ttl_ms: u64,
    pub max_notices: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
            max_notices: DEFAULT_MAX_NOTICES,
        }
    }
}

impl ClientConfig {
    /// Load from `path` (or the default location), apply the process
    /// environment, and validate.
    ///
    /// An explicit `path` must exist; only the default location may be absent.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if !path.exists() => {
                return Err(Error::InvalidConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => Self::load_from_path(path)?,
            None => default_config_path()
                .map_or_else(|| Ok(Self::default()), |path| Self::load_from_path(&path))?,
        };
        config
            .with_env(|key| std::env::var(key).ok())?
            .validated()
    }

    /// Read a JSON config file. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::InvalidConfig(format!(
                "failed to parse config at {}: {error}",
                path.display()
            ))
        })
    }

    /// Overlay `CLIPTRAY_*` variables obtained through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_blank(lookup(ENV_BACKEND_URL)) {
            self.backend_url = url;
        }
        if let Some(raw) = non_blank(lookup(ENV_POLL_INTERVAL_MS)) {
            self.poll_interval_ms = parse_millis(&raw, ENV_POLL_INTERVAL_MS)?;
        }
        if let Some(raw) = non_blank(lookup(ENV_REQUEST_TIMEOUT_MS)) {
            self.request_timeout_ms = parse_millis(&raw, ENV_REQUEST_TIMEOUT_MS)?;
        }
        Ok(self)
    }

    /// Replace the backend URL when `url` is present and non-blank.
    #[must_use]
    pub fn with_backend_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = non_blank(url) {
            self.backend_url = url;
        }
        self
    }

    /// Normalize the backend URL and reject zero intervals.
    pub fn validated(mut self) -> Result<Self> {
        self.backend_url = normalize_backend_url(&self.backend_url)?;
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_notices == 0 {
            return Err(Error::InvalidConfig(
                "max_notices must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub const fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// `<config dir>/cliptray/config.json`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Trim, require an http(s) scheme, and strip trailing slashes.
pub fn normalize_backend_url(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::InvalidConfig("backend_url is required".to_string()));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(Error::InvalidConfig(format!(
            "backend_url '{value}' must include http:// or https://"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_millis(raw: &str, name: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|error| Error::InvalidConfig(format!("{name} must be an integer: {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ClientConfig::default().validated().unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.max_notices, 2);
    }

    #[test]
    fn env_overrides_file_values() {
        let config = ClientConfig {
            backend_url: "http://file.example".to_string(),
            ..ClientConfig::default()
        }
        .with_env(env_from(&[
            (ENV_BACKEND_URL, " http://127.0.0.1:9000/ "),
            (ENV_POLL_INTERVAL_MS, "500"),
        ]))
        .unwrap()
        .validated()
        .unwrap();

        assert_eq!(config.backend_url, "http://127.0.0.1:9000");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn env_rejects_non_numeric_interval() {
        let error = ClientConfig::default()
            .with_env(env_from(&[(ENV_POLL_INTERVAL_MS, "soon")]))
            .unwrap_err();
        assert!(error.to_string().contains(ENV_POLL_INTERVAL_MS));
    }

    #[test]
    fn validation_rejects_missing_scheme_and_zero_interval() {
        let error = ClientConfig::default()
            .with_backend_url(Some("127.0.0.1:5000".to_string()))
            .validated()
            .unwrap_err();
        assert!(error.to_string().contains("http://"));

        let error = ClientConfig {
            poll_interval_ms: 0,
            ..ClientConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(error.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn blank_override_keeps_existing_url() {
        let config = ClientConfig::default().with_backend_url(Some("   ".to_string()));
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn load_from_path_fills_missing_fields_and_rejects_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "backend_url": "http://localhost:7000" }"#).unwrap();
        let config = ClientConfig::load_from_path(&path).unwrap();
        assert_eq!(config.backend_url, "http://localhost:7000");
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);

        std::fs::write(&path, r#"{ "backend": "http://localhost:7000" }"#).unwrap();
        let error = ClientConfig::load_from_path(&path).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn explicit_missing_config_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo.json");

        let error = ClientConfig::resolve(Some(&missing)).unwrap_err();

        assert!(matches!(error, Error::InvalidConfig(_)));
        assert!(error.to_string().contains("typo.json"));
    }
}
