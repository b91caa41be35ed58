//! External provider adapters: upstream market-data APIs mapped into the
//! normalized [`crate::types`] shapes, behind per-capability traits.

pub mod client;
pub mod coingecko;
pub mod registry;

pub use client::{HttpClient, RateLimiter};
pub use coingecko::CoinGeckoProvider;
pub use registry::ProviderRegistry;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chains::ChainIdentifier;
use crate::datastore::now_ms;
use crate::errors::Result;
use crate::types::{PriceBook, Token, TokenList, TokenPrice};

/// Known upstream providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    CoinGecko,
    CoinMarketCap,
    Jupiter,
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::CoinGecko => "coingecko",
            ProviderKind::CoinMarketCap => "coinmarketcap",
            ProviderKind::Jupiter => "jupiter",
            ProviderKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate limit budget: `max_requests` per `per_window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub per_window_ms: u64,
}

/// Connection settings for one provider, passed in from the outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub rate_limit: Option<RateLimitConfig>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            rate_limit: None,
            timeout_secs: 10,
        }
    }
}

/// Price capability of an upstream provider.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// All token prices the provider knows for a chain. On upstream HTTP
    /// failure this returns a degraded fallback book, never an error;
    /// an unmapped chain is a configuration problem and does error.
    async fn prices(&self, chain: ChainIdentifier) -> Result<PriceBook>;

    /// Price for one token by provider-side identifier.
    async fn price(&self, chain: ChainIdentifier, token_id: &str) -> Result<Option<TokenPrice>>;
}

/// Token-metadata capability of an upstream provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The provider's full token list for a chain.
    async fn token_list(&self, chain: ChainIdentifier) -> Result<TokenList>;

    /// One token by provider-side identifier, `None` when unknown.
    async fn token(&self, chain: ChainIdentifier, token_id: &str) -> Result<Option<Token>>;
}

// ============================================================================
// FALLBACK DATA
// ============================================================================
// Served in place of real prices when the upstream is unreachable, so a
// provider outage degrades responses instead of failing them. Synthetic
// values are recognizable (fixed 9.99 price) and the enclosing book is
// marked `degraded`.

pub(crate) fn generic_price(token_id: &str) -> TokenPrice {
    TokenPrice {
        address: token_id.to_string(),
        price_usd: 9.99,
        timestamp: now_ms(),
        change_24h: Some(1.5),
        change_7d: Some(5.2),
        volume_24h: Some(1_000_000.0),
        market_cap: Some(10_000_000.0),
    }
}

pub(crate) fn generic_price_book() -> PriceBook {
    let mut prices = std::collections::HashMap::new();
    for id in ["bitcoin", "ethereum", "solana"] {
        prices.insert(id.to_string(), generic_price(id));
    }
    PriceBook {
        prices,
        updated_at: now_ms(),
        degraded: true,
    }
}
