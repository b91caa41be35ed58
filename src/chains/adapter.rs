use super::{ChainConfig, ChainIdentifier};

/// Chain-specific behavior behind a uniform interface.
///
/// All operations are pure and synchronous; none of them touch the network.
pub trait ChainAdapter: Send + Sync {
    /// The chain+network pair this adapter serves.
    fn chain_identifier(&self) -> ChainIdentifier;

    /// Static metadata for this chain+network.
    fn chain_config(&self) -> &ChainConfig;

    /// Canonicalize an address for this chain.
    ///
    /// Deterministic and idempotent. Never fails: malformed input is
    /// transformed the same way as valid input (validation is a separate
    /// concern, see [`ChainAdapter::is_valid_address`]).
    fn normalize_address(&self, address: &str) -> String;

    /// Shape-check an address for this chain. Pure, no I/O.
    fn is_valid_address(&self, address: &str) -> bool;

    /// Resolve the preferred token identifier: a valid address (normalized)
    /// wins over the symbol; otherwise the uppercased symbol is used.
    fn token_identifier(&self, symbol: &str, address: Option<&str>) -> String {
        if let Some(addr) = address {
            if self.is_valid_address(addr) {
                return self.normalize_address(addr);
            }
        }
        symbol.to_uppercase()
    }
}
