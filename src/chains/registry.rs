//! Registry of chain adapters, one per chain+network pair.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::errors::{DextractError, Result};

use super::adapter::ChainAdapter;
use super::{ChainIdentifier, ChainType, NetworkType};
use super::{EvmAdapter, SolanaAdapter};

/// Holds at most one adapter per (chain, network) pair. Registering the
/// same pair twice replaces the earlier adapter.
#[derive(Default)]
pub struct ChainRegistry {
    adapters: HashMap<ChainIdentifier, Arc<dyn ChainAdapter>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in chain variant.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(EvmAdapter::ethereum_mainnet()));
        registry.register(Arc::new(EvmAdapter::ethereum_testnet()));
        registry.register(Arc::new(EvmAdapter::ethereum_localnet()));
        registry.register(Arc::new(EvmAdapter::bsc_mainnet()));
        registry.register(Arc::new(EvmAdapter::polygon_mainnet()));
        registry.register(Arc::new(EvmAdapter::arbitrum_mainnet()));
        registry.register(Arc::new(EvmAdapter::optimism_mainnet()));
        registry.register(Arc::new(EvmAdapter::avalanche_mainnet()));

        registry.register(Arc::new(SolanaAdapter::mainnet()));
        registry.register(Arc::new(SolanaAdapter::testnet()));
        registry.register(Arc::new(SolanaAdapter::devnet()));
        registry.register(Arc::new(SolanaAdapter::localnet()));

        registry
    }

    /// Store an adapter under the pair it reports for itself.
    pub fn register(&mut self, adapter: Arc<dyn ChainAdapter>) {
        let id = adapter.chain_identifier();
        if self.adapters.insert(id, adapter).is_some() {
            log::debug!("replaced chain adapter for {}", id);
        }
    }

    /// Look up the adapter for an exact pair. There is no fallback across
    /// networks of the same chain.
    pub fn resolve(&self, chain: ChainType, network: NetworkType) -> Result<Arc<dyn ChainAdapter>> {
        let id = ChainIdentifier::new(chain, network);
        self.adapters
            .get(&id)
            .cloned()
            .ok_or_else(|| DextractError::AdapterNotFound(id.to_string()))
    }

    /// Chains with at least one registered adapter, derived from the
    /// adapters' own reported identifiers, without duplicates.
    pub fn supported_chains(&self) -> Vec<ChainType> {
        let chains: BTreeSet<ChainType> = self
            .adapters
            .values()
            .map(|adapter| adapter.chain_identifier().chain)
            .collect();
        chains.into_iter().collect()
    }

    /// Networks registered for one chain.
    pub fn supported_networks(&self, chain: ChainType) -> Vec<NetworkType> {
        let networks: BTreeSet<NetworkType> = self
            .adapters
            .values()
            .map(|adapter| adapter.chain_identifier())
            .filter(|id| id.chain == chain)
            .map(|id| id.network)
            .collect();
        networks.into_iter().collect()
    }

    /// Every registered pair, in stable order.
    pub fn identifiers(&self) -> Vec<ChainIdentifier> {
        let mut ids: Vec<ChainIdentifier> = self.adapters.keys().copied().collect();
        ids.sort();
        ids
    }
}
