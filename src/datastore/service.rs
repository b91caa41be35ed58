//! Typed facade over a [`DataStore`] plus the cache-aside orchestration.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

use super::{DataStore, StoreOptions};

/// Serializes values in and out of the underlying JSON store and provides
/// `get_or_set`, the read-through primitive every domain service builds on.
#[derive(Clone)]
pub struct DataStoreService {
    store: Arc<dyn DataStore>,
}

impl DataStoreService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
        options: &StoreOptions,
    ) -> Result<Option<T>> {
        match self.store.get(key, options).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        options: &StoreOptions,
    ) -> Result<bool> {
        self.store
            .set(key, serde_json::to_value(value)?, options)
            .await
    }

    pub async fn delete(&self, key: &str, options: &StoreOptions) -> Result<bool> {
        self.store.delete(key, options).await
    }

    pub async fn has(&self, key: &str, options: &StoreOptions) -> Result<bool> {
        self.store.has(key, options).await
    }

    pub async fn clear(&self, options: &StoreOptions) -> Result<bool> {
        self.store.clear(options).await
    }

    /// Cache-aside read: return the cached value if present, otherwise run
    /// the factory, store its result, and return it.
    ///
    /// The factory is never invoked on a hit. Factory errors propagate
    /// unmodified and nothing is cached for them. Concurrent misses on the
    /// same key may each run the factory; the last writer wins.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        options: &StoreOptions,
        factory: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key, options).await? {
            return Ok(cached);
        }

        let value = factory().await?;
        self.set(key, &value, options).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::{MemoryStore, Ttl};
    use super::*;
    use crate::errors::DextractError;

    fn service() -> DataStoreService {
        DataStoreService::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn typed_round_trip() {
        let service = service();
        let options = StoreOptions::namespaced("test");

        service
            .set("answer", &vec![1u32, 2, 3], &options)
            .await
            .unwrap();
        let value: Option<Vec<u32>> = service.get("answer", &options).await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn get_or_set_invokes_factory_once() {
        let service = service();
        let options = StoreOptions::namespaced("test");
        let calls = AtomicUsize::new(0);

        let factory = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("value-{}", n))
        };

        let first: String = service
            .get_or_set("key", &options, factory)
            .await
            .unwrap();
        assert_eq!(first, "value-0");

        // Second call hits the cache; a factory producing a different value
        // is never run.
        let second: String = service
            .get_or_set("key", &options, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("other".to_string())
            })
            .await
            .unwrap();

        assert_eq!(second, "value-0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_or_set_propagates_factory_errors_without_caching() {
        let service = service();
        let options = StoreOptions::namespaced("test");

        let result: Result<String> = service
            .get_or_set("key", &options, || async {
                Err(DextractError::NoRoutesFound)
            })
            .await;
        assert!(matches!(result, Err(DextractError::NoRoutesFound)));

        // The failure was not cached: the next factory runs and succeeds.
        let value: String = service
            .get_or_set("key", &options, || async { Ok("recovered".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "recovered");
    }

    #[tokio::test]
    async fn get_or_set_respects_ttl_expiry() {
        let service = service();
        let options = StoreOptions::namespaced("test").ttl(Ttl::Millis(5));

        let first: String = service
            .get_or_set("key", &options, || async { Ok("one".to_string()) })
            .await
            .unwrap();
        assert_eq!(first, "one");

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let second: String = service
            .get_or_set("key", &options, || async { Ok("two".to_string()) })
            .await
            .unwrap();
        assert_eq!(second, "two");
    }
}
