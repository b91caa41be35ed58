//! Solana chain adapter. Addresses are case-sensitive base58, so
//! normalization is the identity function.

use once_cell::sync::Lazy;
use regex::Regex;

use super::adapter::ChainAdapter;
use super::{ChainConfig, ChainIdentifier, ChainType, NativeCurrency, NetworkType};

/// Base58 alphabet (no 0, O, I, l), 32 to 44 characters.
static SOLANA_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"));

pub struct SolanaAdapter {
    config: ChainConfig,
}

impl SolanaAdapter {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn mainnet() -> Self {
        Self::new(ChainConfig {
            name: "Solana Mainnet".to_string(),
            chain: ChainType::Solana,
            network: NetworkType::Mainnet,
            rpc_urls: vec![
                "https://api.mainnet-beta.solana.com".to_string(),
                "https://solana-mainnet.rpc.extrnode.com".to_string(),
            ],
            explorer_url: Some("https://explorer.solana.com".to_string()),
            native_currency: Some(sol()),
        })
    }

    pub fn testnet() -> Self {
        Self::new(ChainConfig {
            name: "Solana Testnet".to_string(),
            chain: ChainType::Solana,
            network: NetworkType::Testnet,
            rpc_urls: vec!["https://api.testnet.solana.com".to_string()],
            explorer_url: Some("https://explorer.solana.com/?cluster=testnet".to_string()),
            native_currency: Some(sol()),
        })
    }

    pub fn devnet() -> Self {
        Self::new(ChainConfig {
            name: "Solana Devnet".to_string(),
            chain: ChainType::Solana,
            network: NetworkType::Devnet,
            rpc_urls: vec!["https://api.devnet.solana.com".to_string()],
            explorer_url: Some("https://explorer.solana.com/?cluster=devnet".to_string()),
            native_currency: Some(sol()),
        })
    }

    pub fn localnet() -> Self {
        Self::new(ChainConfig {
            name: "Solana Local".to_string(),
            chain: ChainType::Solana,
            network: NetworkType::Localnet,
            rpc_urls: vec!["http://localhost:8899".to_string()],
            explorer_url: None,
            native_currency: Some(sol()),
        })
    }
}

fn sol() -> NativeCurrency {
    NativeCurrency {
        name: "Solana".to_string(),
        symbol: "SOL".to_string(),
        decimals: 9,
    }
}

impl ChainAdapter for SolanaAdapter {
    fn chain_identifier(&self) -> ChainIdentifier {
        ChainIdentifier::new(self.config.chain, self.config.network)
    }

    fn chain_config(&self) -> &ChainConfig {
        &self.config
    }

    fn normalize_address(&self, address: &str) -> String {
        // Base58 is case-sensitive; the input already is the canonical form.
        address.to_string()
    }

    fn is_valid_address(&self, address: &str) -> bool {
        SOLANA_ADDRESS_RE.is_match(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[test]
    fn normalize_is_identity() {
        let adapter = SolanaAdapter::mainnet();
        assert_eq!(adapter.normalize_address(USDC_MINT), USDC_MINT);
        // Mixed case is preserved, not folded.
        assert_eq!(adapter.normalize_address("AbCdEf"), "AbCdEf");
    }

    #[test]
    fn validates_addresses() {
        let adapter = SolanaAdapter::mainnet();
        assert!(adapter.is_valid_address(USDC_MINT));
        assert!(adapter.is_valid_address("So11111111111111111111111111111111111111112"));
        // Too short, forbidden characters (0, O, I, l), empty.
        assert!(!adapter.is_valid_address("abc"));
        assert!(!adapter.is_valid_address("0PjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
        assert!(!adapter.is_valid_address(""));
    }

    #[test]
    fn token_identifier_prefers_mint_address() {
        let adapter = SolanaAdapter::mainnet();
        assert_eq!(adapter.token_identifier("usdc", Some(USDC_MINT)), USDC_MINT);
        assert_eq!(adapter.token_identifier("usdc", Some("short")), "USDC");
        assert_eq!(adapter.token_identifier("usdc", None), "USDC");
    }
}
