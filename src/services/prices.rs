//! Price service: cache-aside over provider price books with a short TTL,
//! plus a forced refresh path for the background sweep.

use std::collections::HashMap;
use std::sync::Arc;

use crate::chains::{ChainAdapter, ChainIdentifier, ChainRegistry, ChainType, NetworkType};
use crate::datastore::{DataStoreService, StoreOptions, Ttl};
use crate::errors::Result;
use crate::providers::{generic_price, PriceProvider, ProviderRegistry};
use crate::types::{PriceBook, TokenPrice};

const NAMESPACE: &str = "prices";

/// Prices are volatile; entries live five minutes.
pub const PRICE_TTL_MS: i64 = 5 * 60 * 1000;

fn store_options() -> StoreOptions {
    StoreOptions::namespaced(NAMESPACE).ttl(Ttl::Millis(PRICE_TTL_MS))
}

pub struct PricesService {
    store: DataStoreService,
    chains: Arc<ChainRegistry>,
    providers: Arc<ProviderRegistry<dyn PriceProvider>>,
}

impl PricesService {
    pub fn new(
        store: DataStoreService,
        chains: Arc<ChainRegistry>,
        providers: Arc<ProviderRegistry<dyn PriceProvider>>,
    ) -> Self {
        Self {
            store,
            chains,
            providers,
        }
    }

    /// The aggregate price book for a chain+network. A provider outage
    /// yields a cached degraded book rather than an error; the short TTL
    /// bounds how long the synthetic data lives.
    pub async fn get_all(&self, chain: ChainType, network: NetworkType) -> Result<PriceBook> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let options = store_options();

        self.store
            .get_or_set(&book_key(id), &options, || async {
                let provider = self.providers.default_provider()?;
                let book = provider.prices(id).await?;
                self.normalize_and_index(id, adapter.as_ref(), book, &options)
                    .await
            })
            .await
    }

    /// Price for one token. Resolution order: per-token cache, aggregate
    /// book, direct provider point query, generic fallback. Never fails on
    /// upstream trouble — the fallback path always produces a value.
    pub async fn get_one(
        &self,
        chain: ChainType,
        network: NetworkType,
        token_id: &str,
    ) -> Result<TokenPrice> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let normalized = adapter.normalize_address(token_id);
        let key = price_key(id, &normalized);
        let options = store_options();

        self.store
            .get_or_set(&key, &options, || async {
                match self.get_all(chain, network).await {
                    Ok(book) => {
                        if let Some(price) = book.prices.get(&normalized) {
                            return Ok(price.clone());
                        }
                    }
                    Err(e) => {
                        log::warn!("aggregate price lookup failed for {}: {}", id, e);
                    }
                }

                if let Ok(provider) = self.providers.default_provider() {
                    match provider.price(id, token_id).await {
                        Ok(Some(price)) => return Ok(price),
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!("point price lookup for '{}' failed: {}", token_id, e);
                        }
                    }
                }

                Ok(generic_price(&normalized))
            })
            .await
    }

    /// Forced re-fetch, bypassing the cache-aside read path. Overwrites the
    /// aggregate and every per-token entry. When the provider could only
    /// produce degraded fallback data, the cache is left untouched so real
    /// prices are not clobbered by synthetic ones.
    pub async fn refresh(&self, chain: ChainType, network: NetworkType) -> Result<PriceBook> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let options = store_options();

        let provider = self.providers.default_provider()?;
        let book = provider.prices(id).await?;

        if book.degraded {
            log::warn!("refresh for {} got degraded data; cache left untouched", id);
            return Ok(book);
        }

        let book = self
            .normalize_and_index(id, adapter.as_ref(), book, &options)
            .await?;
        self.store.set(&book_key(id), &book, &options).await?;
        log::info!("refreshed {} prices for {}", book.prices.len(), id);
        Ok(book)
    }

    /// Re-key a provider book by normalized address and write the
    /// individual per-token entries for fast point lookups.
    async fn normalize_and_index(
        &self,
        id: ChainIdentifier,
        adapter: &dyn ChainAdapter,
        book: PriceBook,
        options: &StoreOptions,
    ) -> Result<PriceBook> {
        let mut prices = HashMap::with_capacity(book.prices.len());
        for (_, price) in book.prices {
            let normalized = adapter.normalize_address(&price.address);
            self.store
                .set(&price_key(id, &normalized), &price, options)
                .await?;
            prices.insert(normalized, price);
        }

        Ok(PriceBook {
            prices,
            updated_at: book.updated_at,
            degraded: book.degraded,
        })
    }
}

fn book_key(id: ChainIdentifier) -> String {
    format!("chain:{}:{}:prices", id.chain, id.network)
}

fn price_key(id: ChainIdentifier, token_id: &str) -> String {
    format!("chain:{}:{}:price:{}", id.chain, id.network, token_id)
}
