//! In-process map backend, used for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

use super::{now_ms, CacheEntry, DataStore, StoreOptions, DEFAULT_TTL_MS};

pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl_ms: i64,
}

impl MemoryStore {
    pub fn new(default_ttl_ms: i64) -> Self {
        log::debug!("initializing memory store");
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl_ms,
        }
    }

    #[cfg(test)]
    fn insert_raw(&self, full_key: &str, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(full_key.to_string(), entry);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get(&self, key: &str, options: &StoreOptions) -> Result<Option<Value>> {
        let full_key = options.full_key(key);
        let mut entries = self.entries.lock().unwrap();

        match entries.get(&full_key) {
            Some(entry) if entry.is_expired(now_ms()) => {
                entries.remove(&full_key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, options: &StoreOptions) -> Result<bool> {
        let full_key = options.full_key(key);
        let entry = CacheEntry {
            value,
            expires_at: options.expires_at(self.default_ttl_ms),
        };
        self.entries.lock().unwrap().insert(full_key, entry);
        Ok(true)
    }

    async fn delete(&self, key: &str, options: &StoreOptions) -> Result<bool> {
        let full_key = options.full_key(key);
        Ok(self.entries.lock().unwrap().remove(&full_key).is_some())
    }

    async fn clear(&self, options: &StoreOptions) -> Result<bool> {
        let prefix = format!("{}:", options.namespace_or_default());
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(&prefix));
        Ok(true)
    }
}
