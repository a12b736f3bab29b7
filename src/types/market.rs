use serde::{Deserialize, Serialize};

/// One asset from the market-cap listing, as seen by the screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAsset {
    /// Listing id (e.g. the CoinGecko coin id).
    pub id: String,
    /// Ticker, uppercase.
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    #[serde(default)]
    pub price_change_1h: f64,
    #[serde(default)]
    pub price_change_24h: f64,
    #[serde(default)]
    pub price_change_7d: f64,
    /// Market-cap rank, 1 = largest.
    pub rank: Option<u32>,
}

/// A screened asset with its momentum score and how many screening
/// criteria it met.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedAsset {
    pub asset: MarketAsset,
    pub momentum_score: f64,
    pub criteria_met: u8,
}
