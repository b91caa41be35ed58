//! Hosted KV backend (Cloudflare Workers KV REST surface).
//!
//! The same entry envelope as the memory backend is stored as the value
//! body, so lazy expiry behaves identically; the service-side
//! `expiration_ttl` is set as well so the host eventually drops entries on
//! its own.
//!
//! Known limitation: the host has no bulk clear, only paginated key
//! listing. `clear` deletes one list page (up to 1000 keys) and logs a
//! warning when the listing reports more — it never silently pretends the
//! namespace is empty.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::HostedKvSettings;
use crate::errors::{DextractError, Result};

use super::{now_ms, CacheEntry, DataStore, StoreOptions};

/// Maximum keys per list call, the host's page cap.
const LIST_PAGE_LIMIT: usize = 1000;

const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct HostedKvStore {
    http: reqwest::Client,
    settings: HostedKvSettings,
    default_ttl_ms: i64,
}

#[derive(Debug, Deserialize)]
struct KeyListResponse {
    result: Vec<KeyName>,
    #[serde(default)]
    result_info: Option<KeyListInfo>,
}

#[derive(Debug, Deserialize)]
struct KeyName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct KeyListInfo {
    #[serde(default)]
    cursor: Option<String>,
}

impl HostedKvStore {
    pub fn new(settings: HostedKvSettings, default_ttl_ms: i64) -> Result<Self> {
        log::debug!(
            "initializing hosted KV store (namespace {})",
            settings.namespace_id
        );
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DextractError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            settings,
            default_ttl_ms,
        })
    }

    fn value_url(&self, full_key: &str) -> String {
        format!(
            "{}/accounts/{}/storage/kv/namespaces/{}/values/{}",
            self.settings.base_url,
            self.settings.account_id,
            self.settings.namespace_id,
            full_key
        )
    }

    fn keys_url(&self) -> String {
        format!(
            "{}/accounts/{}/storage/kv/namespaces/{}/keys",
            self.settings.base_url, self.settings.account_id, self.settings.namespace_id
        )
    }
}

#[async_trait]
impl DataStore for HostedKvStore {
    async fn get(&self, key: &str, options: &StoreOptions) -> Result<Option<Value>> {
        let full_key = options.full_key(key);
        let response = self
            .http
            .get(self.value_url(&full_key))
            .bearer_auth(&self.settings.api_token)
            .send()
            .await
            .map_err(|e| DextractError::Cache(format!("KV get failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DextractError::Cache(format!(
                "KV get returned HTTP {}",
                response.status()
            )));
        }

        let entry: CacheEntry = response
            .json()
            .await
            .map_err(|e| DextractError::Cache(format!("KV get decode failed: {}", e)))?;

        if entry.is_expired(now_ms()) {
            self.delete(key, options).await?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: Value, options: &StoreOptions) -> Result<bool> {
        let full_key = options.full_key(key);
        let expires_at = options.expires_at(self.default_ttl_ms);
        let entry = CacheEntry { value, expires_at };

        let mut request = self
            .http
            .put(self.value_url(&full_key))
            .bearer_auth(&self.settings.api_token)
            .body(serde_json::to_string(&entry)?);

        // Mirror the envelope expiry on the host side, in whole seconds.
        if let Some(at) = expires_at {
            let ttl_secs = ((at - now_ms()) as f64 / 1000.0).ceil() as i64;
            request = request.query(&[("expiration_ttl", ttl_secs.max(60).to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DextractError::Cache(format!("KV put failed: {}", e)))?;

        Ok(response.status().is_success())
    }

    async fn delete(&self, key: &str, options: &StoreOptions) -> Result<bool> {
        let full_key = options.full_key(key);
        let response = self
            .http
            .delete(self.value_url(&full_key))
            .bearer_auth(&self.settings.api_token)
            .send()
            .await
            .map_err(|e| DextractError::Cache(format!("KV delete failed: {}", e)))?;

        Ok(response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND)
    }

    async fn clear(&self, options: &StoreOptions) -> Result<bool> {
        let namespace = options.namespace_or_default();
        let prefix = format!("{}:", namespace);

        let limit = LIST_PAGE_LIMIT.to_string();
        let response = self
            .http
            .get(self.keys_url())
            .bearer_auth(&self.settings.api_token)
            .query(&[("prefix", prefix.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| DextractError::Cache(format!("KV list failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DextractError::Cache(format!(
                "KV list returned HTTP {}",
                response.status()
            )));
        }

        let listing: KeyListResponse = response
            .json()
            .await
            .map_err(|e| DextractError::Cache(format!("KV list decode failed: {}", e)))?;

        let deleted = listing.result.len();
        for key in &listing.result {
            let response = self
                .http
                .delete(self.value_url(&key.name))
                .bearer_auth(&self.settings.api_token)
                .send()
                .await
                .map_err(|e| DextractError::Cache(format!("KV delete failed: {}", e)))?;
            if !response.status().is_success()
                && response.status() != reqwest::StatusCode::NOT_FOUND
            {
                return Err(DextractError::Cache(format!(
                    "KV delete returned HTTP {}",
                    response.status()
                )));
            }
        }

        let more_remaining = listing
            .result_info
            .and_then(|info| info.cursor)
            .map_or(false, |cursor| !cursor.is_empty());
        if more_remaining {
            log::warn!(
                "KV clear of namespace '{}' deleted {} keys but more remain (list page cap is {})",
                namespace,
                deleted,
                LIST_PAGE_LIMIT
            );
        } else {
            log::debug!("KV clear of namespace '{}' deleted {} keys", namespace, deleted);
        }

        Ok(true)
    }
}
