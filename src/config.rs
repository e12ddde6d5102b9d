//! Driver configuration.
//!
//! Values are layered with increasing precedence:
//!
//! 1. Hardcoded defaults
//! 2. A TOML file, when one is given
//! 3. `IPAM_*` environment variables
//!
//! The merged result is validated before it is returned.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use ipam_constants::pool::DEFAULT_NAMESPACE;
use ipam_constants::pool::DEFAULT_STORE_TIMEOUT_MS;
use ipam_constants::pool::MAX_NAMESPACE_LEN;
use ipam_constants::pool::MAX_STORE_TIMEOUT_MS;
use ipam_pool::RegistryConfig;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use snafu::Snafu;
use tracing::info;

/// Environment variable names.
pub mod env {
    pub const NAMESPACE: &str = "IPAM_NAMESPACE";
    pub const STORE_ENDPOINTS: &str = "IPAM_STORE_ENDPOINTS";
    pub const STORE_TIMEOUT_MS: &str = "IPAM_STORE_TIMEOUT_MS";
    pub const PURGE_ON_RELEASE: &str = "IPAM_PURGE_ON_RELEASE";
    pub const LOG: &str = "IPAM_LOG";
}

/// Configuration error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid configuration for {key}: '{value}' ({reason})"))]
    InvalidValue { key: String, value: String, reason: String },

    /// The configuration file could not be read.
    #[snafu(display("failed to read config file {}: {source}", path.display()))]
    ReadFile { path: PathBuf, source: std::io::Error },

    /// The configuration file is not valid TOML for this schema.
    #[snafu(display("failed to parse config file {}: {source}", path.display()))]
    ParseToml { path: PathBuf, source: toml::de::Error },
}

fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpamConfig {
    /// Key prefix for all pool and reservation records.
    pub namespace: String,
    /// Store cluster endpoints, handed to the host's store client.
    pub store_endpoints: Vec<String>,
    /// Deadline for each individual store request.
    pub store_timeout_ms: u64,
    /// Delete a pool's reservations together with the pool.
    pub purge_reservations_on_release: bool,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for IpamConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            store_endpoints: vec!["http://127.0.0.1:4001".to_string()],
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            purge_reservations_on_release: true,
            log_filter: None,
        }
    }
}

impl IpamConfig {
    /// Parse configuration from a TOML string. Missing fields take defaults.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).context(ParseTomlSnafu { path })
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
        Self::from_toml_str(&contents, path)
    }

    /// Load defaults, then `path` if given, then the process environment,
    /// and validate the result.
    pub fn load_with_layers(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_lookup(path, |key| std::env::var(key).ok())
    }

    /// Same as [`load_with_layers`](Self::load_with_layers) with an explicit
    /// environment source.
    pub fn load_with_lookup<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "loading configuration file");
                Self::from_toml_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `IPAM_*` variables returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where F: Fn(&str) -> Option<String> {
        if let Some(val) = lookup(env::NAMESPACE) {
            self.namespace = val;
        }
        if let Some(val) = lookup(env::STORE_ENDPOINTS) {
            self.store_endpoints = val.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
        }
        if let Some(val) = lookup(env::STORE_TIMEOUT_MS) {
            self.store_timeout_ms = val
                .trim()
                .parse()
                .map_err(|e| invalid(env::STORE_TIMEOUT_MS, val.clone(), format!("must be milliseconds: {e}")))?;
        }
        if let Some(val) = lookup(env::PURGE_ON_RELEASE) {
            self.purge_reservations_on_release = parse_bool(&val)
                .ok_or_else(|| invalid(env::PURGE_ON_RELEASE, val.clone(), "must be true or false"))?;
        }
        if let Some(val) = lookup(env::LOG) {
            self.log_filter = Some(val);
        }
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim_end_matches('/').is_empty() {
            return Err(invalid("namespace", self.namespace.clone(), "must not be empty"));
        }
        if self.namespace.len() > MAX_NAMESPACE_LEN as usize {
            return Err(invalid(
                "namespace",
                self.namespace.clone(),
                format!("must be at most {MAX_NAMESPACE_LEN} bytes"),
            ));
        }
        if self.store_endpoints.is_empty() {
            return Err(invalid("store_endpoints", "", "at least one endpoint is required"));
        }
        if self.store_timeout_ms == 0 || self.store_timeout_ms > MAX_STORE_TIMEOUT_MS {
            return Err(invalid(
                "store_timeout_ms",
                self.store_timeout_ms.to_string(),
                format!("must be between 1 and {MAX_STORE_TIMEOUT_MS}"),
            ));
        }
        Ok(())
    }

    /// Per-request store deadline.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Registry settings derived from this configuration.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            namespace: self.namespace.clone(),
            purge_reservations: self.purge_reservations_on_release,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
