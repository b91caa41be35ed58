//! Constructed dependency container. Everything the services need is
//! built here once and passed down explicitly — no ambient singletons, so
//! tests can assemble a context from fakes.

use std::sync::Arc;

use crate::chains::ChainRegistry;
use crate::config::{AppConfig, CacheBackend};
use crate::datastore::{DataStore, DataStoreService, HostedKvStore, MemoryStore};
use crate::errors::{DextractError, Result};
use crate::providers::{
    CoinGeckoProvider, PriceProvider, ProviderKind, ProviderRegistry, TokenProvider,
};
use crate::services::{PricesService, RouteSource, SwapsService, TokensService};

pub struct AppContext {
    pub store: DataStoreService,
    pub chains: Arc<ChainRegistry>,
    pub token_providers: Arc<ProviderRegistry<dyn TokenProvider>>,
    pub price_providers: Arc<ProviderRegistry<dyn PriceProvider>>,
    pub tokens: Arc<TokensService>,
    pub prices: Arc<PricesService>,
    pub swaps: Arc<SwapsService>,
}

impl AppContext {
    /// Assemble the full context from configuration: cache backend, chain
    /// registry with the built-in adapters, provider registries with
    /// CoinGecko as the default for both capabilities, and the three
    /// domain services on top.
    pub fn build(config: &AppConfig, routes: Arc<dyn RouteSource>) -> Result<Self> {
        let backend: Arc<dyn DataStore> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryStore::new(config.cache.default_ttl_ms)),
            CacheBackend::HostedKv => {
                let settings = config.cache.hosted.clone().ok_or_else(|| {
                    DextractError::Config(
                        "cache.hosted settings are required for the hosted-kv backend".to_string(),
                    )
                })?;
                Arc::new(HostedKvStore::new(settings, config.cache.default_ttl_ms)?)
            }
        };
        let store = DataStoreService::new(backend);

        let chains = Arc::new(ChainRegistry::with_defaults());

        let coingecko = Arc::new(CoinGeckoProvider::new(&config.providers.coingecko)?);

        let mut token_providers: ProviderRegistry<dyn TokenProvider> =
            ProviderRegistry::new(ProviderKind::CoinGecko);
        token_providers.register(
            ProviderKind::CoinGecko,
            coingecko.clone() as Arc<dyn TokenProvider>,
        );
        let token_providers = Arc::new(token_providers);

        let mut price_providers: ProviderRegistry<dyn PriceProvider> =
            ProviderRegistry::new(ProviderKind::CoinGecko);
        price_providers.register(
            ProviderKind::CoinGecko,
            coingecko as Arc<dyn PriceProvider>,
        );
        let price_providers = Arc::new(price_providers);

        let tokens = Arc::new(TokensService::new(
            store.clone(),
            chains.clone(),
            token_providers.clone(),
        ));
        let prices = Arc::new(PricesService::new(
            store.clone(),
            chains.clone(),
            price_providers.clone(),
        ));
        let swaps = Arc::new(SwapsService::new(
            store.clone(),
            chains.clone(),
            tokens.clone(),
            routes,
        ));

        Ok(Self {
            store,
            chains,
            token_providers,
            price_providers,
            tokens,
            prices,
            swaps,
        })
    }
}
