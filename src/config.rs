//! Application configuration: plain structs deserialized from TOML by the
//! binary and handed into [`crate::AppContext::build`]. The library never
//! reads the environment itself.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::datastore::DEFAULT_TTL_MS;
use crate::errors::{DextractError, Result};
use crate::providers::ProviderConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub providers: ProvidersConfig,
    pub workers: WorkerSettings,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DextractError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| DextractError::Config(e.to_string()))
    }
}

/// Cache backend selection and TTL defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub default_ttl_ms: i64,
    /// Required when `backend = "hosted-kv"`.
    pub hosted: Option<HostedKvSettings>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            default_ttl_ms: DEFAULT_TTL_MS,
            hosted: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheBackend {
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "hosted-kv")]
    HostedKv,
}

/// Hosted KV connection settings (account-scoped namespace plus token).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedKvSettings {
    pub base_url: String,
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

impl Default for HostedKvSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            account_id: String::new(),
            namespace_id: String::new(),
            api_token: String::new(),
        }
    }
}

/// Per-provider connection settings. Unset fields (base URL, rate limit)
/// fall back to the provider's own built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub coingecko: ProviderConfig,
}

/// Background sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub enabled: bool,
    /// Token discovery interval; daily by default.
    pub token_sweep_secs: u64,
    /// Price refresh interval; five minutes by default.
    pub price_sweep_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            token_sweep_secs: 24 * 60 * 60,
            price_sweep_secs: 5 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.default_ttl_ms, DEFAULT_TTL_MS);
        assert!(config.workers.enabled);
        assert_eq!(config.workers.price_sweep_secs, 300);
        // Provider specifics (base URL, free-tier rate limit) are filled in
        // by the provider itself when left unset here.
        assert_eq!(config.providers.coingecko.rate_limit, None);
        assert_eq!(config.providers.coingecko.timeout_secs, 10);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [cache]
            backend = "hosted-kv"

            [cache.hosted]
            account_id = "acc"
            namespace_id = "ns"
            api_token = "secret"

            [providers.coingecko]
            api_key = "demo-key"
            timeout_secs = 20

            [workers]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.backend, CacheBackend::HostedKv);
        let hosted = config.cache.hosted.unwrap();
        assert_eq!(hosted.account_id, "acc");
        assert!(hosted.base_url.starts_with("https://api.cloudflare.com"));

        assert_eq!(config.providers.coingecko.api_key.as_deref(), Some("demo-key"));
        assert_eq!(config.providers.coingecko.timeout_secs, 20);
        assert!(!config.workers.enabled);
        assert_eq!(config.workers.token_sweep_secs, 24 * 60 * 60);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("cache = 12"),
            Err(DextractError::Config(_))
        ));
    }
}
