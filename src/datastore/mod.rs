//! Namespaced, TTL-aware key-value cache abstraction.
//!
//! Two interchangeable backends implement the same [`DataStore`] contract:
//! an in-process map ([`MemoryStore`]) and a hosted KV service
//! ([`HostedKvStore`]). The typed [`DataStoreService`] facade adds the
//! cache-aside `get_or_set` orchestration on top.

pub mod hosted_kv;
pub mod memory;
pub mod service;

pub use hosted_kv::HostedKvStore;
pub use memory::MemoryStore;
pub use service::DataStoreService;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// Namespace applied when the caller does not specify one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Backend default time-to-live: 24 hours.
pub const DEFAULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Time-to-live policy for a stored entry.
///
/// `Default` defers to the backend default (24 h). `None` stores the entry
/// without an expiry at all — the policy used for token lists, which only
/// change through explicit discovery or a cache bust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    #[default]
    Default,
    Millis(i64),
    None,
}

/// Per-call store options: key namespace and TTL policy.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub namespace: Option<String>,
    pub ttl: Ttl,
}

impl StoreOptions {
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ttl: Ttl::Default,
        }
    }

    pub fn ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Flattened storage key. The namespace prefix is what keeps unrelated
    /// key spaces apart, so `clear` on one namespace cannot touch another.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace_or_default(), key)
    }

    /// Absolute expiry for an entry written now, or `None` for entries
    /// that never expire.
    pub fn expires_at(&self, default_ttl_ms: i64) -> Option<i64> {
        match self.ttl {
            Ttl::Default => Some(now_ms() + default_ttl_ms),
            Ttl::Millis(ms) => Some(now_ms() + ms),
            Ttl::None => None,
        }
    }
}

/// The stored envelope: the value plus its absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map_or(false, |at| at < now)
    }
}

/// Namespaced, TTL-aware key-value store over JSON payloads.
///
/// Expiry is lazy: a `get` that finds a stale entry deletes it and reports
/// a miss. There is no background sweep.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// `None` on miss or on an expired entry (which is deleted as a side
    /// effect before returning).
    async fn get(&self, key: &str, options: &StoreOptions) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value, options: &StoreOptions) -> Result<bool>;

    async fn delete(&self, key: &str, options: &StoreOptions) -> Result<bool>;

    /// Equivalent to `get(key).is_some()`, stale-entry deletion included.
    async fn has(&self, key: &str, options: &StoreOptions) -> Result<bool> {
        Ok(self.get(key, options).await?.is_some())
    }

    /// Delete every key under the options' namespace. With no namespace
    /// given, only the default namespace is cleared — never the whole
    /// store, so other namespaces survive an unscoped clear.
    async fn clear(&self, options: &StoreOptions) -> Result<bool>;
}
