//! Adapter for the Ethereum family: Ethereum itself plus the EVM-compatible
//! chains (BSC, Polygon, Arbitrum, Optimism, Avalanche C-Chain). They all
//! share the hex address format, so one adapter serves every variant and
//! only the static metadata differs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::adapter::ChainAdapter;
use super::{ChainConfig, ChainIdentifier, ChainType, NativeCurrency, NetworkType};

/// 0x-prefixed, exactly 40 hex characters.
static EVM_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex"));

pub struct EvmAdapter {
    config: ChainConfig,
}

impl EvmAdapter {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn ethereum_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Ethereum Mainnet".to_string(),
            chain: ChainType::Ethereum,
            network: NetworkType::Mainnet,
            rpc_urls: vec![
                "https://eth.llamarpc.com".to_string(),
                "https://rpc.ankr.com/eth".to_string(),
            ],
            explorer_url: Some("https://etherscan.io".to_string()),
            native_currency: Some(ether()),
        })
    }

    pub fn ethereum_testnet() -> Self {
        Self::new(ChainConfig {
            name: "Ethereum Goerli".to_string(),
            chain: ChainType::Ethereum,
            network: NetworkType::Testnet,
            rpc_urls: vec!["https://rpc.ankr.com/eth_goerli".to_string()],
            explorer_url: Some("https://goerli.etherscan.io".to_string()),
            native_currency: Some(NativeCurrency {
                name: "Goerli Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            }),
        })
    }

    pub fn ethereum_localnet() -> Self {
        Self::new(ChainConfig {
            name: "Ethereum Local".to_string(),
            chain: ChainType::Ethereum,
            network: NetworkType::Localnet,
            rpc_urls: vec!["http://localhost:8545".to_string()],
            explorer_url: None,
            native_currency: Some(ether()),
        })
    }

    pub fn bsc_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "BNB Smart Chain".to_string(),
            chain: ChainType::Bsc,
            network: NetworkType::Mainnet,
            rpc_urls: vec!["https://bsc-dataseed.binance.org".to_string()],
            explorer_url: Some("https://bscscan.com".to_string()),
            native_currency: Some(NativeCurrency {
                name: "BNB".to_string(),
                symbol: "BNB".to_string(),
                decimals: 18,
            }),
        })
    }

    pub fn polygon_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Polygon Mainnet".to_string(),
            chain: ChainType::Polygon,
            network: NetworkType::Mainnet,
            rpc_urls: vec!["https://polygon-rpc.com".to_string()],
            explorer_url: Some("https://polygonscan.com".to_string()),
            native_currency: Some(NativeCurrency {
                name: "MATIC".to_string(),
                symbol: "MATIC".to_string(),
                decimals: 18,
            }),
        })
    }

    pub fn arbitrum_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Arbitrum One".to_string(),
            chain: ChainType::Arbitrum,
            network: NetworkType::Mainnet,
            rpc_urls: vec!["https://arb1.arbitrum.io/rpc".to_string()],
            explorer_url: Some("https://arbiscan.io".to_string()),
            native_currency: Some(ether()),
        })
    }

    pub fn optimism_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Optimism Mainnet".to_string(),
            chain: ChainType::Optimism,
            network: NetworkType::Mainnet,
            rpc_urls: vec!["https://mainnet.optimism.io".to_string()],
            explorer_url: Some("https://optimistic.etherscan.io".to_string()),
            native_currency: Some(ether()),
        })
    }

    pub fn avalanche_mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Avalanche C-Chain".to_string(),
            chain: ChainType::Avalanche,
            network: NetworkType::Mainnet,
            rpc_urls: vec!["https://api.avax.network/ext/bc/C/rpc".to_string()],
            explorer_url: Some("https://snowtrace.io".to_string()),
            native_currency: Some(NativeCurrency {
                name: "Avalanche".to_string(),
                symbol: "AVAX".to_string(),
                decimals: 18,
            }),
        })
    }
}

fn ether() -> NativeCurrency {
    NativeCurrency {
        name: "Ether".to_string(),
        symbol: "ETH".to_string(),
        decimals: 18,
    }
}

impl ChainAdapter for EvmAdapter {
    fn chain_identifier(&self) -> ChainIdentifier {
        ChainIdentifier::new(self.config.chain, self.config.network)
    }

    fn chain_config(&self) -> &ChainConfig {
        &self.config
    }

    fn normalize_address(&self, address: &str) -> String {
        // Hex addresses are case-insensitive; lowercase is the canonical form.
        address.to_lowercase()
    }

    fn is_valid_address(&self, address: &str) -> bool {
        EVM_ADDRESS_RE.is_match(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    #[test]
    fn normalize_lowercases() {
        let adapter = EvmAdapter::ethereum_mainnet();
        let normalized = adapter.normalize_address(USDC);
        assert_eq!(normalized, USDC.to_lowercase());
        assert!(normalized.chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let adapter = EvmAdapter::ethereum_mainnet();
        let once = adapter.normalize_address(USDC);
        assert_eq!(adapter.normalize_address(&once), once);
    }

    #[test]
    fn normalize_does_not_reject_malformed_input() {
        let adapter = EvmAdapter::ethereum_mainnet();
        assert_eq!(adapter.normalize_address("NOT-AN-ADDRESS"), "not-an-address");
    }

    #[test]
    fn validates_addresses() {
        let adapter = EvmAdapter::ethereum_mainnet();
        assert!(adapter.is_valid_address(USDC));
        assert!(adapter.is_valid_address(&USDC.to_lowercase()));
        // Wrong length, missing prefix, non-hex characters.
        assert!(!adapter.is_valid_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB4"));
        assert!(!adapter.is_valid_address("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(!adapter.is_valid_address("0xZZb86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(!adapter.is_valid_address(""));
    }

    #[test]
    fn token_identifier_prefers_valid_address() {
        let adapter = EvmAdapter::ethereum_mainnet();
        assert_eq!(
            adapter.token_identifier("usdc", Some(USDC)),
            USDC.to_lowercase()
        );
        assert_eq!(adapter.token_identifier("usdc", Some("bogus")), "USDC");
        assert_eq!(adapter.token_identifier("usdc", None), "USDC");
    }

    #[test]
    fn family_constructors_carry_their_chain() {
        assert_eq!(
            EvmAdapter::bsc_mainnet().chain_identifier(),
            ChainIdentifier::new(ChainType::Bsc, NetworkType::Mainnet)
        );
        assert_eq!(
            EvmAdapter::avalanche_mainnet().chain_identifier(),
            ChainIdentifier::new(ChainType::Avalanche, NetworkType::Mainnet)
        );
    }
}
