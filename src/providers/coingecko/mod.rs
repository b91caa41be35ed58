//! CoinGecko provider adapter (price + token capabilities).
//!
//! API documentation: https://docs.coingecko.com/reference/introduction
//!
//! Endpoints used:
//! 1. /coins/markets - token list and bulk prices per chain category
//! 2. /coins/{id}   - point lookup for one token
//! 3. /search       - fallback resolution of unknown identifiers

pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use self::types::{CoinDetail, MarketCoin, SearchResponse};
use crate::chains::{ChainIdentifier, NetworkType};
use crate::datastore::now_ms;
use crate::errors::{DextractError, Result};
use crate::types::{ListVersion, PriceBook, Token, TokenList, TokenPrice};

use super::client::{HttpClient, RateLimiter};
use super::{
    generic_price, generic_price_book, PriceProvider, ProviderConfig, RateLimitConfig,
    TokenProvider,
};

// ============================================================================
// API CONFIGURATION
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Free-tier budget: 10 requests per minute.
const DEFAULT_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    max_requests: 10,
    per_window_ms: 60_000,
};

/// Demo-tier API key header.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// One page of the markets endpoint; the free tier caps page size here.
const MARKETS_PAGE_SIZE: &str = "250";

/// Substituted when the markets row carries no price at all.
const MISSING_PRICE_USD: f64 = 9.99;

/// Exact per-token decimals would need a chain lookup; 18 covers the
/// overwhelming majority of listed tokens.
const DEFAULT_TOKEN_DECIMALS: u8 = 18;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct CoinGeckoProvider {
    http: HttpClient,
    limiter: RateLimiter,
    config: ProviderConfig,
}

impl CoinGeckoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut config = config.clone();
        if config.base_url.is_empty() {
            config.base_url = DEFAULT_BASE_URL.to_string();
        }

        let http = HttpClient::new(config.timeout_secs)?;
        let limiter = RateLimiter::new(&config.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT));

        Ok(Self {
            http,
            limiter,
            config,
        })
    }

    /// CoinGecko's own name for a chain. Only mainnets are listed there.
    fn chain_alias(chain: ChainIdentifier) -> Result<&'static str> {
        use crate::chains::ChainType::*;

        if chain.network != NetworkType::Mainnet {
            return Err(DextractError::UnsupportedChain {
                chain: chain.chain,
                network: chain.network,
            });
        }

        Ok(match chain.chain {
            Ethereum => "ethereum",
            Solana => "solana",
            Bsc => "binance-smart-chain",
            Polygon => "polygon-pos",
            Arbitrum => "arbitrum-one",
            Optimism => "optimistic-ethereum",
            Avalanche => "avalanche",
        })
    }

    /// GET a JSON endpoint under the configured base URL. `Ok(None)` maps
    /// a 404; other non-success statuses are errors.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self
            .http
            .client()
            .get(&url)
            .query(query)
            .header("Accept", "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DextractError::UpstreamRequestFailed(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(Some(response.json::<T>().await?))
    }

    async fn markets(&self, alias: &str, with_changes: bool) -> Result<Vec<MarketCoin>> {
        let mut query = vec![
            ("vs_currency", "usd"),
            ("category", alias),
            ("order", "market_cap_desc"),
            ("per_page", MARKETS_PAGE_SIZE),
            ("page", "1"),
            ("sparkline", "false"),
        ];
        if with_changes {
            query.push(("price_change_percentage", "24h,7d"));
        }

        self.fetch_json::<Vec<MarketCoin>>("/coins/markets", &query)
            .await?
            .ok_or_else(|| {
                DextractError::UpstreamRequestFailed("markets endpoint not found".to_string())
            })
    }

    async fn coin_detail(&self, token_id: &str) -> Result<Option<CoinDetail>> {
        self.fetch_json::<CoinDetail>(
            &format!("/coins/{}", token_id),
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ],
        )
        .await
    }

    /// Resolve an identifier the detail endpoint did not know, by search,
    /// restricted to coins present on the requested chain.
    async fn search_token(&self, chain: ChainIdentifier, query: &str) -> Result<Option<Token>> {
        let alias = Self::chain_alias(chain)?;

        let search = match self
            .fetch_json::<SearchResponse>("/search", &[("query", query)])
            .await
        {
            Ok(Some(search)) => search,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::warn!("token search for '{}' failed: {}", query, e);
                return Ok(None);
            }
        };

        let candidate = search
            .coins
            .into_iter()
            .find(|coin| coin.platforms.contains_key(alias));

        match candidate {
            Some(coin) => match self.coin_detail(&coin.id).await {
                Ok(Some(detail)) => Ok(Some(token_from_detail(&detail, chain))),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn prices(&self, chain: ChainIdentifier) -> Result<PriceBook> {
        let alias = Self::chain_alias(chain)?;

        match self.markets(alias, true).await {
            Ok(coins) => {
                let now = now_ms();
                let prices = coins
                    .iter()
                    .map(|coin| (coin.id.clone(), price_from_market(coin, now)))
                    .collect();
                Ok(PriceBook {
                    prices,
                    updated_at: now,
                    degraded: false,
                })
            }
            Err(e) => {
                log::warn!(
                    "price list fetch failed for {}: {} - serving fallback data",
                    chain,
                    e
                );
                Ok(generic_price_book())
            }
        }
    }

    async fn price(&self, chain: ChainIdentifier, token_id: &str) -> Result<Option<TokenPrice>> {
        match self.coin_detail(token_id).await {
            Ok(Some(detail)) => match price_from_detail(&detail, now_ms()) {
                Some(price) => Ok(Some(price)),
                None => Ok(Some(generic_price(token_id))),
            },
            Ok(None) => Ok(Some(generic_price(token_id))),
            Err(e) => {
                log::warn!(
                    "price fetch for '{}' on {} failed: {} - serving fallback data",
                    token_id,
                    chain,
                    e
                );
                Ok(Some(generic_price(token_id)))
            }
        }
    }
}

#[async_trait]
impl TokenProvider for CoinGeckoProvider {
    async fn token_list(&self, chain: ChainIdentifier) -> Result<TokenList> {
        let alias = Self::chain_alias(chain)?;
        let coins = self.markets(alias, false).await?;

        let tokens = coins
            .iter()
            .map(|coin| token_from_market(coin, chain))
            .collect();

        Ok(TokenList {
            name: format!("{} Tokens", capitalize(alias)),
            logo_uri: None,
            tokens,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: ListVersion::default(),
        })
    }

    async fn token(&self, chain: ChainIdentifier, token_id: &str) -> Result<Option<Token>> {
        match self.coin_detail(token_id).await {
            Ok(Some(detail)) => Ok(Some(token_from_detail(&detail, chain))),
            Ok(None) => self.search_token(chain, token_id).await,
            Err(e) => {
                log::debug!("detail lookup for '{}' failed ({}), trying search", token_id, e);
                self.search_token(chain, token_id).await
            }
        }
    }
}

// ============================================================================
// RESPONSE MAPPING
// ============================================================================

fn price_from_market(coin: &MarketCoin, now: i64) -> TokenPrice {
    TokenPrice {
        address: coin.id.clone(),
        price_usd: coin.current_price.unwrap_or(MISSING_PRICE_USD),
        timestamp: now,
        change_24h: coin.price_change_percentage_24h,
        change_7d: coin.price_change_7d,
        volume_24h: coin.total_volume,
        market_cap: coin.market_cap,
    }
}

fn price_from_detail(detail: &CoinDetail, now: i64) -> Option<TokenPrice> {
    let market = detail.market_data.as_ref()?;
    let usd = |map: &Option<std::collections::HashMap<String, f64>>| {
        map.as_ref().and_then(|m| m.get("usd").copied())
    };

    Some(TokenPrice {
        address: detail.id.clone(),
        price_usd: usd(&market.current_price).unwrap_or(MISSING_PRICE_USD),
        timestamp: now,
        change_24h: market.price_change_percentage_24h,
        change_7d: market.price_change_percentage_7d,
        volume_24h: usd(&market.total_volume),
        market_cap: usd(&market.market_cap),
    })
}

fn token_from_market(coin: &MarketCoin, chain: ChainIdentifier) -> Token {
    Token {
        // The provider-side coin id stands in for the address; services
        // normalize it like any other identifier.
        address: coin.id.clone(),
        symbol: coin.symbol.to_uppercase(),
        name: coin.name.clone(),
        decimals: DEFAULT_TOKEN_DECIMALS,
        logo_uri: coin.image.clone(),
        tags: Vec::new(),
        chain: chain.chain,
        network: chain.network,
    }
}

fn token_from_detail(detail: &CoinDetail, chain: ChainIdentifier) -> Token {
    Token {
        address: detail.id.clone(),
        symbol: detail.symbol.to_uppercase(),
        name: detail.name.clone(),
        decimals: DEFAULT_TOKEN_DECIMALS,
        logo_uri: detail.image.as_ref().and_then(|i| i.large.clone()),
        tags: Vec::new(),
        chain: chain.chain,
        network: chain.network,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
