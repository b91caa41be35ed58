//! Registry of provider adapters per capability, with a designated default.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{DextractError, Result};

use super::ProviderKind;

/// Adapters keyed by provider name. One registry exists per capability
/// (prices, tokens), each instantiated with the trait object of that
/// capability. Registering the same kind twice replaces the earlier
/// adapter.
pub struct ProviderRegistry<P: ?Sized> {
    adapters: HashMap<ProviderKind, Arc<P>>,
    default: ProviderKind,
}

impl<P: ?Sized> ProviderRegistry<P> {
    pub fn new(default: ProviderKind) -> Self {
        Self {
            adapters: HashMap::new(),
            default,
        }
    }

    pub fn register(&mut self, kind: ProviderKind, adapter: Arc<P>) {
        if self.adapters.insert(kind, adapter).is_some() {
            log::debug!("replaced provider adapter for {}", kind);
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<P>> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| DextractError::AdapterNotFound(kind.to_string()))
    }

    pub fn default_provider(&self) -> Result<Arc<P>> {
        self.get(self.default)
    }

    pub fn default_kind(&self) -> ProviderKind {
        self.default
    }

    /// Registered provider names, in stable order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.adapters.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::chains::ChainIdentifier;
    use crate::providers::{PriceProvider, TokenProvider};
    use crate::types::{PriceBook, Token, TokenList, TokenPrice};

    struct Stub;

    #[async_trait]
    impl PriceProvider for Stub {
        async fn prices(&self, _chain: ChainIdentifier) -> crate::Result<PriceBook> {
            unimplemented!("not exercised")
        }
        async fn price(
            &self,
            _chain: ChainIdentifier,
            _token_id: &str,
        ) -> crate::Result<Option<TokenPrice>> {
            unimplemented!("not exercised")
        }
    }

    #[async_trait]
    impl TokenProvider for Stub {
        async fn token_list(&self, _chain: ChainIdentifier) -> crate::Result<TokenList> {
            unimplemented!("not exercised")
        }
        async fn token(
            &self,
            _chain: ChainIdentifier,
            _token_id: &str,
        ) -> crate::Result<Option<Token>> {
            unimplemented!("not exercised")
        }
    }

    #[test]
    fn get_and_default_resolve_registered_adapters() {
        let mut registry: ProviderRegistry<dyn PriceProvider> =
            ProviderRegistry::new(ProviderKind::CoinGecko);
        registry.register(ProviderKind::CoinGecko, Arc::new(Stub));
        registry.register(ProviderKind::Jupiter, Arc::new(Stub));

        assert!(registry.get(ProviderKind::Jupiter).is_ok());
        assert!(registry.default_provider().is_ok());
        assert_eq!(registry.default_kind(), ProviderKind::CoinGecko);
        assert_eq!(
            registry.providers(),
            vec![ProviderKind::CoinGecko, ProviderKind::Jupiter]
        );
    }

    #[test]
    fn get_fails_for_unregistered_provider() {
        let registry: ProviderRegistry<dyn TokenProvider> =
            ProviderRegistry::new(ProviderKind::CoinGecko);
        let err = registry.get(ProviderKind::CoinMarketCap).err().unwrap();
        assert!(matches!(err, DextractError::AdapterNotFound(_)));
        // The default is not registered either.
        assert!(registry.default_provider().is_err());
    }
}
