//! Wire shapes for the CoinGecko REST API. Only the fields the adapter
//! actually maps are decoded.

use std::collections::HashMap;

use serde::Deserialize;

/// One row of `/coins/markets`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    #[serde(rename = "price_change_percentage_7d_in_currency")]
    pub price_change_7d: Option<f64>,
    pub total_volume: Option<f64>,
    pub market_cap: Option<f64>,
}

/// `/coins/{id}` detail response.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<CoinImage>,
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinImage {
    pub large: Option<String>,
    pub small: Option<String>,
}

/// Per-currency maps keyed by fiat/crypto symbol ("usd", "eur", ...).
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarketData {
    pub current_price: Option<HashMap<String, f64>>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub total_volume: Option<HashMap<String, f64>>,
    pub market_cap: Option<HashMap<String, f64>>,
}

/// `/search` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    #[serde(default)]
    pub platforms: HashMap<String, String>,
}
