//! Normalized domain types produced by provider adapters and served by the
//! domain services. These are the shapes that live in the cache, so all of
//! them are serde round-trippable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chains::{ChainType, NetworkType};

// ============================================================================
// TOKENS
// ============================================================================

/// A token on a specific chain+network, normalized by the chain adapter.
///
/// The address representation is chain-dependent: lowercase hex for the
/// EVM family, case-sensitive base58 for Solana.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub chain: ChainType,
    pub network: NetworkType,
}

/// An aggregate token list for one chain+network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenList {
    pub name: String,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    pub tokens: Vec<Token>,
    /// RFC 3339 capture time of the list.
    pub timestamp: String,
    pub version: ListVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Default for ListVersion {
    fn default() -> Self {
        Self {
            major: 1,
            minor: 0,
            patch: 0,
        }
    }
}

/// Outcome record of an incremental token discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSync {
    /// Epoch milliseconds of the check.
    pub checked_at: i64,
    /// How many previously unseen tokens the pass appended.
    pub new_tokens: usize,
}

// ============================================================================
// PRICES
// ============================================================================

/// A point-in-time USD price for one token. Short-lived; always carries the
/// capture timestamp in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub address: String,
    pub price_usd: f64,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_7d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

/// Aggregate price response for one chain+network, keyed by normalized
/// token address.
///
/// `degraded` marks synthetic fallback data served after an upstream
/// failure, so callers can tell a real quote from a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBook {
    pub prices: HashMap<String, TokenPrice>,
    pub updated_at: i64,
    #[serde(default)]
    pub degraded: bool,
}

// ============================================================================
// SWAPS
// ============================================================================

/// One candidate route returned by the routing collaborator. Amounts are
/// decimal integer strings at token scale; they are never parsed into
/// floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRoute {
    pub from_token: String,
    pub to_token: String,
    pub from_amount: String,
    pub to_amount: String,
    pub price_impact: f64,
    pub path: Vec<String>,
    pub providers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gas: Option<String>,
}

/// A quote: all candidate routes plus the best one by output amount.
/// Derived per request and cached briefly; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub routes: Vec<SwapRoute>,
    pub best_route: SwapRoute,
    pub from_token: String,
    pub to_token: String,
    pub from_amount: String,
    pub updated_at: i64,
}
