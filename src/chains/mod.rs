//! Chain identity types and per-chain adapters.
//!
//! A [`ChainAdapter`] owns the chain-specific rules (address normalization,
//! address validation, token-identifier resolution) for exactly one
//! chain+network pair. The [`ChainRegistry`] resolves adapters by pair.

pub mod adapter;
pub mod evm;
pub mod registry;
pub mod solana;

pub use adapter::ChainAdapter;
pub use evm::EvmAdapter;
pub use registry::ChainRegistry;
pub use solana::SolanaAdapter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported blockchains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Ethereum,
    Solana,
    Bsc,
    Polygon,
    Arbitrum,
    Optimism,
    Avalanche,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Ethereum => "ethereum",
            ChainType::Solana => "solana",
            ChainType::Bsc => "bsc",
            ChainType::Polygon => "polygon",
            ChainType::Arbitrum => "arbitrum",
            ChainType::Optimism => "optimism",
            ChainType::Avalanche => "avalanche",
        }
    }

    /// Numeric chain ID used by the legacy addressing scheme. Boundary
    /// translation only; nothing internal is keyed by these.
    pub fn legacy_chain_id(&self) -> u64 {
        match self {
            ChainType::Ethereum => 1,
            ChainType::Solana => 101,
            ChainType::Bsc => 56,
            ChainType::Polygon => 137,
            ChainType::Arbitrum => 42161,
            ChainType::Optimism => 10,
            ChainType::Avalanche => 43114,
        }
    }

    /// Reverse of [`ChainType::legacy_chain_id`].
    pub fn from_legacy_chain_id(id: u64) -> Option<ChainType> {
        match id {
            1 => Some(ChainType::Ethereum),
            101 => Some(ChainType::Solana),
            56 => Some(ChainType::Bsc),
            137 => Some(ChainType::Polygon),
            42161 => Some(ChainType::Arbitrum),
            10 => Some(ChainType::Optimism),
            43114 => Some(ChainType::Avalanche),
            _ => None,
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethereum" => Ok(ChainType::Ethereum),
            "solana" => Ok(ChainType::Solana),
            "bsc" => Ok(ChainType::Bsc),
            "polygon" => Ok(ChainType::Polygon),
            "arbitrum" => Ok(ChainType::Arbitrum),
            "optimism" => Ok(ChainType::Optimism),
            "avalanche" => Ok(ChainType::Avalanche),
            other => Err(format!("unknown chain: {}", other)),
        }
    }
}

/// Network flavors of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Devnet => "devnet",
            NetworkType::Localnet => "localnet",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            "devnet" => Ok(NetworkType::Devnet),
            "localnet" => Ok(NetworkType::Localnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// The universal key for adapter and cache lookups: chain + network.
/// Equality is structural over both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainIdentifier {
    pub chain: ChainType,
    pub network: NetworkType,
}

impl ChainIdentifier {
    pub fn new(chain: ChainType, network: NetworkType) -> Self {
        Self { chain, network }
    }
}

impl fmt::Display for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.network)
    }
}

/// Native currency descriptor of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Static per-(chain, network) metadata. Built once when the registry is
/// assembled; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain: ChainType,
    pub network: NetworkType,
    /// Ordered endpoint list; the first entry is preferred.
    pub rpc_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_type_string_round_trip() {
        for chain in [
            ChainType::Ethereum,
            ChainType::Solana,
            ChainType::Bsc,
            ChainType::Polygon,
            ChainType::Arbitrum,
            ChainType::Optimism,
            ChainType::Avalanche,
        ] {
            assert_eq!(chain.as_str().parse::<ChainType>(), Ok(chain));
        }
        assert!("dogecoin".parse::<ChainType>().is_err());
    }

    #[test]
    fn legacy_chain_id_round_trip() {
        for chain in [
            ChainType::Ethereum,
            ChainType::Solana,
            ChainType::Bsc,
            ChainType::Polygon,
            ChainType::Arbitrum,
            ChainType::Optimism,
            ChainType::Avalanche,
        ] {
            assert_eq!(
                ChainType::from_legacy_chain_id(chain.legacy_chain_id()),
                Some(chain)
            );
        }
        assert_eq!(ChainType::from_legacy_chain_id(2), None);
    }

    #[test]
    fn chain_identifier_display_is_composite() {
        let id = ChainIdentifier::new(ChainType::Ethereum, NetworkType::Mainnet);
        assert_eq!(id.to_string(), "ethereum:mainnet");
    }

    #[test]
    fn chain_identifier_equality_is_structural() {
        let a = ChainIdentifier::new(ChainType::Solana, NetworkType::Devnet);
        let b = ChainIdentifier::new(ChainType::Solana, NetworkType::Devnet);
        let c = ChainIdentifier::new(ChainType::Solana, NetworkType::Mainnet);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn chain_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChainType::Avalanche).unwrap(),
            "\"avalanche\""
        );
        assert_eq!(
            serde_json::from_str::<NetworkType>("\"devnet\"").unwrap(),
            NetworkType::Devnet
        );
    }
}
