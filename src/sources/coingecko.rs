use crate::error::AppError;
use crate::sources::{error_excerpt, MarketDataSource, SourceFuture};
use crate::types::MarketAsset;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const COINGECKO_PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";
/// Page size ceiling of /coins/markets.
const MAX_PER_PAGE: usize = 250;

/// One row of /coins/markets.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    total_volume: Option<f64>,
    price_change_percentage_1h_in_currency: Option<f64>,
    price_change_percentage_24h_in_currency: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

impl From<CoinGeckoMarket> for MarketAsset {
    fn from(m: CoinGeckoMarket) -> Self {
        MarketAsset {
            id: m.id,
            symbol: m.symbol.to_uppercase(),
            name: m.name,
            price: m.current_price.unwrap_or(0.0),
            market_cap: m.market_cap.unwrap_or(0.0),
            volume_24h: m.total_volume.unwrap_or(0.0),
            price_change_1h: m.price_change_percentage_1h_in_currency.unwrap_or(0.0),
            price_change_24h: m
                .price_change_percentage_24h_in_currency
                .or(m.price_change_percentage_24h)
                .unwrap_or(0.0),
            price_change_7d: m.price_change_percentage_7d_in_currency.unwrap_or(0.0),
            rank: m.market_cap_rank,
        }
    }
}

/// CoinGecko REST client for the market-cap listing.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko client.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0 (Crypto Signal Scanner)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    fn base_url(&self) -> &str {
        if self.api_key.is_some() {
            COINGECKO_PRO_API_URL
        } else {
            COINGECKO_API_URL
        }
    }

    async fn fetch_markets(&self, limit: usize) -> Result<Vec<MarketAsset>, AppError> {
        let mut url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=1h,24h,7d",
            self.base_url(),
            limit.clamp(1, MAX_PER_PAGE)
        );

        if let Some(ref key) = self.api_key {
            url.push_str(&format!("&x_cg_pro_api_key={}", key));
        }

        info!("Fetching top {} assets by market cap from CoinGecko", limit);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("CoinGecko API returned {}: {}", status, error_excerpt(&text));
            return Err(AppError::ExternalApi(format!("CoinGecko API error: {}", status)));
        }

        let markets: Vec<CoinGeckoMarket> = response.json().await?;
        let assets: Vec<MarketAsset> = markets.into_iter().map(MarketAsset::from).collect();

        debug!("CoinGecko returned {} assets", assets.len());
        Ok(assets)
    }
}

impl MarketDataSource for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn top_assets_by_market_cap(&self, limit: usize) -> SourceFuture<'_, Vec<MarketAsset>> {
        Box::pin(self.fetch_markets(limit))
    }
}
