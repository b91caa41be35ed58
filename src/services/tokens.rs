//! Token metadata service: cache-aside over the provider token lists, with
//! incremental discovery of newly listed tokens.

use std::collections::HashSet;
use std::sync::Arc;

use crate::chains::{ChainIdentifier, ChainRegistry, ChainType, NetworkType};
use crate::datastore::{now_ms, DataStoreService, StoreOptions, Ttl};
use crate::errors::Result;
use crate::providers::{ProviderRegistry, TokenProvider};
use crate::types::{LastSync, Token, TokenList};

const NAMESPACE: &str = "tokens";

/// Cached token lists have no expiry: once fetched they persist until an
/// explicit discovery pass or a cache bust replaces them.
fn store_options() -> StoreOptions {
    StoreOptions::namespaced(NAMESPACE).ttl(Ttl::None)
}

pub struct TokensService {
    store: DataStoreService,
    chains: Arc<ChainRegistry>,
    providers: Arc<ProviderRegistry<dyn TokenProvider>>,
}

impl TokensService {
    pub fn new(
        store: DataStoreService,
        chains: Arc<ChainRegistry>,
        providers: Arc<ProviderRegistry<dyn TokenProvider>>,
    ) -> Self {
        Self {
            store,
            chains,
            providers,
        }
    }

    /// The full token list for a chain+network, fetched through the default
    /// provider on first access and served from the cache afterwards.
    pub async fn get_all(&self, chain: ChainType, network: NetworkType) -> Result<TokenList> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let options = store_options();

        self.store
            .get_or_set(&list_key(id), &options, || async {
                let provider = self.providers.default_provider()?;
                let mut list = provider.token_list(id).await?;
                for token in &mut list.tokens {
                    token.address = adapter.normalize_address(&token.address);
                }
                log::info!("loaded {} tokens for {}", list.tokens.len(), id);
                Ok(list)
            })
            .await
    }

    /// One token by identifier (address or symbol). Resolution order:
    /// per-token cache, full-list scan, direct provider point query. The
    /// result of the two slower paths is written back to the per-token key.
    pub async fn get_one(
        &self,
        chain: ChainType,
        network: NetworkType,
        token_id: &str,
    ) -> Result<Option<Token>> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let normalized = adapter.normalize_address(token_id);
        let key = token_key(id, &normalized);
        let options = store_options();

        if let Some(token) = self.store.get::<Token>(&key, &options).await? {
            return Ok(Some(token));
        }

        let list = self.get_all(chain, network).await?;
        if let Some(token) = list.tokens.iter().find(|t| t.address == normalized) {
            self.store.set(&key, token, &options).await?;
            return Ok(Some(token.clone()));
        }

        let provider = self.providers.default_provider()?;
        if let Some(mut token) = provider.token(id, token_id).await? {
            token.address = adapter.normalize_address(&token.address);
            self.store.set(&key, &token, &options).await?;
            return Ok(Some(token));
        }

        Ok(None)
    }

    /// Incremental discovery: fetch the current upstream list, diff it
    /// against the cached one by normalized address, and append anything
    /// new. Known tokens are never replaced. A sync record is written even
    /// when nothing changed. Returns the merged list.
    pub async fn check_for_new_tokens(
        &self,
        chain: ChainType,
        network: NetworkType,
    ) -> Result<TokenList> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        let options = store_options();

        let provider = self.providers.default_provider()?;
        let mut fresh = provider.token_list(id).await?;
        for token in &mut fresh.tokens {
            token.address = adapter.normalize_address(&token.address);
        }

        let cached: Option<TokenList> = self.store.get(&list_key(id), &options).await?;
        let merged = match cached {
            None => {
                // Nothing cached yet: the fresh list becomes the baseline.
                for token in &fresh.tokens {
                    self.store
                        .set(&token_key(id, &token.address), token, &options)
                        .await?;
                }
                self.store.set(&list_key(id), &fresh, &options).await?;
                self.record_sync(id, fresh.tokens.len(), &options).await?;
                log::info!("initial token sync for {}: {} tokens", id, fresh.tokens.len());
                fresh
            }
            Some(mut known_list) => {
                let known: HashSet<String> = known_list
                    .tokens
                    .iter()
                    .map(|t| t.address.clone())
                    .collect();

                let new_tokens: Vec<Token> = fresh
                    .tokens
                    .into_iter()
                    .filter(|t| !known.contains(&t.address))
                    .collect();

                if new_tokens.is_empty() {
                    log::debug!("token sync for {}: nothing new", id);
                } else {
                    log::info!("token sync for {}: {} new tokens", id, new_tokens.len());
                    for token in &new_tokens {
                        self.store
                            .set(&token_key(id, &token.address), token, &options)
                            .await?;
                    }
                    known_list.tokens.extend(new_tokens.iter().cloned());
                    known_list.timestamp = chrono::Utc::now().to_rfc3339();
                    self.store
                        .set(&list_key(id), &known_list, &options)
                        .await?;
                }

                self.record_sync(id, new_tokens.len(), &options).await?;
                known_list
            }
        };

        Ok(merged)
    }

    /// Last discovery outcome for a chain+network, if one has run.
    pub async fn last_sync(
        &self,
        chain: ChainType,
        network: NetworkType,
    ) -> Result<Option<LastSync>> {
        let id = ChainIdentifier::new(chain, network);
        self.store.get(&sync_key(id), &store_options()).await
    }

    async fn record_sync(
        &self,
        id: ChainIdentifier,
        new_tokens: usize,
        options: &StoreOptions,
    ) -> Result<()> {
        let record = LastSync {
            checked_at: now_ms(),
            new_tokens,
        };
        self.store.set(&sync_key(id), &record, options).await?;
        Ok(())
    }
}

fn list_key(id: ChainIdentifier) -> String {
    format!("chain:{}:{}:tokens", id.chain, id.network)
}

fn token_key(id: ChainIdentifier, token_id: &str) -> String {
    format!("chain:{}:{}:token:{}", id.chain, id.network, token_id)
}

fn sync_key(id: ChainIdentifier) -> String {
    format!("chain:{}:{}:last-sync", id.chain, id.network)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::datastore::MemoryStore;
    use crate::errors::DextractError;
    use crate::types::ListVersion;

    /// Provider fake with a scripted list and point lookup, counting calls.
    pub(crate) struct FakeTokenProvider {
        pub list: Mutex<Vec<Token>>,
        pub point: Mutex<Option<Token>>,
        pub list_calls: AtomicUsize,
        pub point_calls: AtomicUsize,
    }

    impl FakeTokenProvider {
        pub fn with_list(tokens: Vec<Token>) -> Self {
            Self {
                list: Mutex::new(tokens),
                point: Mutex::new(None),
                list_calls: AtomicUsize::new(0),
                point_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenProvider for FakeTokenProvider {
        async fn token_list(&self, _chain: ChainIdentifier) -> Result<TokenList> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(TokenList {
                name: "Fake Tokens".to_string(),
                logo_uri: None,
                tokens: self.list.lock().unwrap().clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                version: ListVersion::default(),
            })
        }

        async fn token(&self, _chain: ChainIdentifier, _token_id: &str) -> Result<Option<Token>> {
            self.point_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.point.lock().unwrap().clone())
        }
    }

    pub(crate) fn eth_token(address: &str, symbol: &str) -> Token {
        Token {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals: 18,
            logo_uri: None,
            tags: Vec::new(),
            chain: ChainType::Ethereum,
            network: NetworkType::Mainnet,
        }
    }

    pub(crate) fn service_with(provider: Arc<FakeTokenProvider>) -> TokensService {
        let store = DataStoreService::new(Arc::new(MemoryStore::default()));
        let chains = Arc::new(ChainRegistry::with_defaults());
        let mut registry: ProviderRegistry<dyn TokenProvider> =
            ProviderRegistry::new(crate::providers::ProviderKind::CoinGecko);
        registry.register(crate::providers::ProviderKind::CoinGecko, provider);
        TokensService::new(store, chains, Arc::new(registry))
    }

    const UPPER: &str = "0xAAB185A24B8F40BFBD6E95B80A4eed9C5D2f26BE";

    #[tokio::test]
    async fn get_all_normalizes_and_caches() {
        let provider = Arc::new(FakeTokenProvider::with_list(vec![eth_token(UPPER, "AAB")]));
        let service = service_with(provider.clone());

        let list = service
            .get_all(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();
        assert_eq!(list.tokens[0].address, UPPER.to_lowercase());

        // Second read is served from the cache.
        service
            .get_all(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();
        assert_eq!(provider.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_one_hits_same_entry_regardless_of_input_case() {
        let provider = Arc::new(FakeTokenProvider::with_list(vec![eth_token(UPPER, "AAB")]));
        let service = service_with(provider.clone());

        let by_upper = service
            .get_one(ChainType::Ethereum, NetworkType::Mainnet, UPPER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_upper.address, UPPER.to_lowercase());

        let by_lower = service
            .get_one(
                ChainType::Ethereum,
                NetworkType::Mainnet,
                &UPPER.to_lowercase(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_lower, by_upper);

        // One list fetch total; the second lookup was a pure cache hit and
        // the point endpoint was never needed.
        assert_eq!(provider.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.point_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_one_falls_back_to_point_query() {
        let provider = Arc::new(FakeTokenProvider::with_list(vec![]));
        *provider.point.lock().unwrap() = Some(eth_token(UPPER, "AAB"));
        let service = service_with(provider.clone());

        let token = service
            .get_one(ChainType::Ethereum, NetworkType::Mainnet, UPPER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.address, UPPER.to_lowercase());
        assert_eq!(provider.point_calls.load(Ordering::SeqCst), 1);

        // The point result was cached under the per-token key.
        service
            .get_one(ChainType::Ethereum, NetworkType::Mainnet, UPPER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(provider.point_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_one_returns_none_when_absent_everywhere() {
        let provider = Arc::new(FakeTokenProvider::with_list(vec![]));
        let service = service_with(provider);

        let token = service
            .get_one(ChainType::Ethereum, NetworkType::Mainnet, "0xdeadbeef")
            .await
            .unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn get_one_fails_for_unregistered_pair() {
        let provider = Arc::new(FakeTokenProvider::with_list(vec![]));
        let service = service_with(provider);

        let err = service
            .get_one(ChainType::Bsc, NetworkType::Devnet, "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, DextractError::AdapterNotFound(_)));
    }

    #[tokio::test]
    async fn check_for_new_tokens_appends_and_caches_individually() {
        let token_a = eth_token("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "AAA");
        let token_b = eth_token("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "BBB");

        let provider = Arc::new(FakeTokenProvider::with_list(vec![token_a.clone()]));
        let service = service_with(provider.clone());

        // Seed the cache with [A].
        service
            .get_all(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();

        // Upstream now lists [A, B].
        *provider.list.lock().unwrap() = vec![token_a.clone(), token_b.clone()];

        let merged = service
            .check_for_new_tokens(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();
        let addresses: Vec<&str> = merged.tokens.iter().map(|t| t.address.as_str()).collect();
        assert_eq!(addresses, vec![token_a.address.as_str(), token_b.address.as_str()]);

        // The aggregate was updated and B is individually cached.
        let cached = service
            .get_all(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();
        assert_eq!(cached.tokens.len(), 2);

        let list_calls_before = provider.list_calls.load(Ordering::SeqCst);
        let b = service
            .get_one(ChainType::Ethereum, NetworkType::Mainnet, &token_b.address)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.symbol, "BBB");
        assert_eq!(provider.list_calls.load(Ordering::SeqCst), list_calls_before);

        let sync = service
            .last_sync(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sync.new_tokens, 1);
    }

    #[tokio::test]
    async fn check_for_new_tokens_updates_timestamp_only_when_unchanged() {
        let token_a = eth_token("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "AAA");
        let provider = Arc::new(FakeTokenProvider::with_list(vec![token_a]));
        let service = service_with(provider);

        service
            .get_all(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();

        let merged = service
            .check_for_new_tokens(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap();
        assert_eq!(merged.tokens.len(), 1);

        let sync = service
            .last_sync(ChainType::Ethereum, NetworkType::Mainnet)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sync.new_tokens, 0);
    }
}
