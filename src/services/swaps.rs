//! Swap quote service: validates the token pair, collects candidate routes
//! from the routing collaborator, and picks the best one by output amount.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::chains::{ChainIdentifier, ChainRegistry, ChainType, NetworkType};
use crate::datastore::{now_ms, DataStoreService, StoreOptions, Ttl};
use crate::errors::{DextractError, Result};
use crate::types::{SwapQuote, SwapRoute};

use super::tokens::TokensService;

const NAMESPACE: &str = "swaps";

/// Quotes go stale fast; cache entries live thirty seconds.
pub const QUOTE_TTL_MS: i64 = 30 * 1000;

fn store_options() -> StoreOptions {
    StoreOptions::namespaced(NAMESPACE).ttl(Ttl::Millis(QUOTE_TTL_MS))
}

/// Routing collaborator: produces candidate routes for a pair and amount.
/// Route discovery itself (DEX aggregators, on-chain paths) lives outside
/// this crate; implementations are injected at construction.
#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn routes(
        &self,
        chain: ChainIdentifier,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<Vec<SwapRoute>>;
}

/// Development stand-in until a real routing integration is wired in:
/// echoes a single direct-path route with a zero output amount.
pub struct DevRouteSource;

#[async_trait]
impl RouteSource for DevRouteSource {
    async fn routes(
        &self,
        _chain: ChainIdentifier,
        from_token: &str,
        to_token: &str,
        amount: &str,
    ) -> Result<Vec<SwapRoute>> {
        Ok(vec![SwapRoute {
            from_token: from_token.to_string(),
            to_token: to_token.to_string(),
            from_amount: amount.to_string(),
            to_amount: "0".to_string(),
            price_impact: 0.01,
            path: vec![from_token.to_string(), to_token.to_string()],
            providers: vec!["Example DEX".to_string()],
            estimated_gas: None,
        }])
    }
}

pub struct SwapsService {
    store: DataStoreService,
    chains: Arc<ChainRegistry>,
    tokens: Arc<TokensService>,
    routes: Arc<dyn RouteSource>,
}

impl SwapsService {
    pub fn new(
        store: DataStoreService,
        chains: Arc<ChainRegistry>,
        tokens: Arc<TokensService>,
        routes: Arc<dyn RouteSource>,
    ) -> Self {
        Self {
            store,
            chains,
            tokens,
            routes,
        }
    }

    /// A quote for swapping `amount` of `from_id` into `to_id`, cached by
    /// the full parameter tuple. Both tokens must resolve through the token
    /// service; an empty route set is an error, not an empty quote.
    pub async fn get_quote(
        &self,
        chain: ChainType,
        network: NetworkType,
        from_id: &str,
        to_id: &str,
        amount: &str,
    ) -> Result<SwapQuote> {
        let id = ChainIdentifier::new(chain, network);
        let adapter = self.chains.resolve(chain, network)?;
        // Case-variant inputs share one cache entry.
        let from_norm = adapter.normalize_address(from_id);
        let to_norm = adapter.normalize_address(to_id);
        let key = quote_key(id, &from_norm, &to_norm, amount);
        let options = store_options();

        self.store
            .get_or_set(&key, &options, || async {
                log::debug!(
                    "quoting {} {} -> {} on {}",
                    amount,
                    from_norm,
                    to_norm,
                    id
                );

                let from_token = self.tokens.get_one(chain, network, from_id).await?;
                let to_token = self.tokens.get_one(chain, network, to_id).await?;
                let (from_token, to_token) = match (from_token, to_token) {
                    (Some(from), Some(to)) => (from, to),
                    _ => {
                        return Err(DextractError::TokensNotFound {
                            from: from_norm.clone(),
                            to: to_norm.clone(),
                        })
                    }
                };

                let routes = self
                    .routes
                    .routes(id, &from_token.address, &to_token.address, amount)
                    .await?;
                if routes.is_empty() {
                    return Err(DextractError::NoRoutesFound);
                }

                let best_route = best_route(&routes).clone();

                Ok(SwapQuote {
                    routes,
                    best_route,
                    from_token: from_token.address,
                    to_token: to_token.address,
                    from_amount: amount.to_string(),
                    updated_at: now_ms(),
                })
            })
            .await
    }
}

/// The route with the highest `to_amount`; the first one wins on a tie.
fn best_route(routes: &[SwapRoute]) -> &SwapRoute {
    let mut best = &routes[0];
    for route in &routes[1..] {
        if cmp_decimal(&route.to_amount, &best.to_amount) == Ordering::Greater {
            best = route;
        }
    }
    best
}

/// Compare two non-negative decimal integer strings numerically without
/// parsing them: amounts are at token scale and can exceed any machine
/// integer, and floats would lose precision. Longer (after stripping
/// leading zeros) means larger; equal widths compare lexicographically.
fn cmp_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

fn quote_key(id: ChainIdentifier, from: &str, to: &str, amount: &str) -> String {
    format!(
        "chain:{}:{}:quote:{}:{}:{}",
        id.chain, id.network, from, to, amount
    )
}
