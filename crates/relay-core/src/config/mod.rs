//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `RELAY_CONFIG` env var
//! 3. **Environment variables**: `RELAY__*` env vars override specific fields
//!
//! Environment keys are lowercased on the way in, so method names in the shard table
//! (`getBalance`) cannot be expressed there. `RELAY__DISPATCH__SHARDS__*` is rejected;
//! shard tables come from the file only.
//!
//! # Configuration Sections
//!
//! - [`EndpointsConfig`]: Upstream URLs, in pool order
//! - [`DispatchConfig`]: Policy choice and the method shard table
//! - [`HttpConfig`]: Concurrency limit and timeouts for the shared HTTP client
//! - [`LoggingConfig`]: Log level and format
//!
//! # Example
//!
//! ```toml
//! [endpoints]
//! urls = [
//!     "https://rpc-a.example.com",
//!     "https://rpc-b.example.com",
//!     "https://rpc-c.example.com",
//!     "https://rpc-d.example.com",
//! ]
//!
//! [dispatch]
//! policy = "method_sharded"
//!
//! [dispatch.shards]
//! getAccountInfo = 0
//! getBalance = 0
//! getTransaction = 1
//! sendTransaction = 2
//! ```

use crate::{
    dispatch::{MethodShardMap, PolicyKind},
    upstream::HttpClientConfig,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, time::Duration};

/// Upstream endpoints, in the order that defines round-robin sequence and shard indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Endpoint URLs. Cannot be empty; each must start with `http` or `https`.
    pub urls: Vec<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            urls: (1..=4)
                .map(|n| format!("https://devnet.helius-rpc.com/?api-key=YOUR_API_KEY_{n}"))
                .collect(),
        }
    }
}

/// Dispatch policy selection and sharding table.
///
/// The sample table from [`Default`] applies only when the `[dispatch]` section is absent
/// altogether. A section without `shards` means an empty table, so every method goes to
/// the overflow shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Which policy the client uses. Defaults to `method_sharded`.
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,

    /// Method name → endpoint index. Only used by the `method_sharded` policy.
    #[serde(default)]
    pub shards: HashMap<String, usize>,

    /// Index used for methods absent from `shards`. Defaults to the last endpoint.
    #[serde(default)]
    pub default_shard: Option<usize>,
}

fn default_policy() -> PolicyKind {
    PolicyKind::MethodSharded
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let shards = [
            ("getAccountInfo", 0),
            ("getBalance", 0),
            ("getTransaction", 1),
            ("getLatestBlockhash", 1),
            ("sendTransaction", 2),
        ]
        .into_iter()
        .map(|(method, index)| (method.to_string(), index))
        .collect();

        Self { policy: default_policy(), shards, default_shard: None }
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Maximum in-flight HTTP requests across all endpoints. Defaults to `1000`.
    pub concurrent_limit: usize,

    /// Milliseconds to wait for a concurrency permit. Defaults to `500`.
    pub permit_timeout_ms: u64,

    /// TCP connect timeout in seconds. Defaults to `5`.
    pub connect_timeout_seconds: u64,

    /// Default per-request timeout in seconds. Defaults to `30`.
    pub request_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 1000,
            permit_timeout_ms: 500,
            connect_timeout_seconds: 5,
            request_timeout_seconds: 30,
        }
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Root configuration for a dispatch client.
///
/// Environment overrides use the `RELAY` prefix and `__` as a separator, e.g.
/// `RELAY__DISPATCH__POLICY=round_robin`. `RELAY__ENDPOINTS__URLS` takes a
/// comma-separated list. `dispatch.shards` is file-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; defaults and environment apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized, or if the
    /// environment tries to set shard entries.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        reject_env_shards(std::env::vars())?;

        let config_builder = Config::builder()
            .set_default("http.concurrent_limit", 1000)?
            .set_default("http.permit_timeout_ms", 500)?
            .set_default("http.connect_timeout_seconds", 5)?
            .set_default("http.request_timeout_seconds", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("endpoints.urls")
                    .try_parsing(true),
            )
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/relay.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `RELAY_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("RELAY_CONFIG").unwrap_or_else(|_| "config/relay.toml".to_string());
        Self::from_file(&config_path)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_seconds)
    }

    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            concurrent_limit: self.http.concurrent_limit,
            permit_timeout_ms: self.http.permit_timeout_ms,
            connect_timeout_seconds: self.http.connect_timeout_seconds,
        }
    }

    /// Builds the shard map, placing the overflow shard on the last endpoint unless
    /// `dispatch.default_shard` says otherwise.
    #[must_use]
    pub fn shard_map(&self) -> MethodShardMap {
        let default_shard = self
            .dispatch
            .default_shard
            .unwrap_or_else(|| self.endpoints.urls.len().saturating_sub(1));
        MethodShardMap::new(self.dispatch.shards.clone(), default_shard)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - At least one endpoint is configured, and every URL is `http(s)`
    /// - Shard indices fit the endpoint list when the sharded policy is active
    /// - Concurrency and timeouts are greater than zero
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.urls.is_empty() {
            return Err("No upstream RPC endpoints configured".to_string());
        }

        for url in &self.endpoints.urls {
            if url.is_empty() {
                return Err("Empty endpoint URL".to_string());
            }
            if !url.starts_with("http") {
                return Err(format!("Invalid endpoint URL: {url}"));
            }
        }

        if self.dispatch.policy == PolicyKind::MethodSharded {
            self.shard_map().validate(self.endpoints.urls.len()).map_err(|e| e.to_string())?;
        }

        if self.http.concurrent_limit == 0 {
            return Err("HTTP concurrent limit must be greater than 0".to_string());
        }

        if self.http.request_timeout_seconds == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(format!(
                "Invalid logging format '{}': expected 'json' or 'pretty'",
                self.logging.format
            ));
        }

        Ok(())
    }
}

/// Shard keys are method names and case-sensitive; the environment source would
/// lowercase them and silently route the method to the overflow shard instead.
fn reject_env_shards<I>(vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    const SHARDS_PREFIX: &str = "RELAY__DISPATCH__SHARDS__";

    match vars.into_iter().find(|(key, _)| key.to_ascii_uppercase().starts_with(SHARDS_PREFIX)) {
        Some((key, _)) => Err(ConfigError::Message(format!(
            "{key}: shard tables cannot be set from the environment, use the config file"
        ))),
        None => Ok(()),
    }
}
