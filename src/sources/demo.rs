//! Offline demo data: seeded random walks and a fixed market listing.

use crate::error::AppError;
use crate::sources::{DataSource, MarketDataSource, SourceFuture};
use crate::types::{AssetPair, MarketAsset, OhlcPoint, OhlcvSeries, Timeframe};
use rand::prelude::*;
use tracing::debug;

/// Reference prices for the demo listing: (symbol, name, price, market cap).
pub const DEMO_ASSETS: &[(&str, &str, f64, f64)] = &[
    ("BTC", "Bitcoin", 65_000.0, 1.28e12),
    ("ETH", "Ethereum", 3_500.0, 4.2e11),
    ("USDT", "Tether", 1.0, 1.1e11),
    ("BNB", "BNB", 600.0, 8.8e10),
    ("SOL", "Solana", 180.0, 8.0e10),
    ("XRP", "XRP", 0.60, 3.3e10),
    ("DOGE", "Dogecoin", 0.15, 2.1e10),
    ("ADA", "Cardano", 0.45, 1.6e10),
    ("AVAX", "Avalanche", 35.0, 1.3e10),
    ("LINK", "Chainlink", 18.0, 1.05e10),
    ("DOT", "Polkadot", 7.5, 1.0e10),
];

/// Price used for symbols outside the demo listing.
const DEFAULT_BASE_PRICE: f64 = 100.0;
/// Daily volatility of the random walk.
const DAILY_VOLATILITY: f64 = 0.02;

/// Deterministic stand-in for both the exchange and the market listing.
#[derive(Debug, Clone)]
pub struct DemoSource {
    seed: u64,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DemoSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn base_price(symbol: &str) -> f64 {
        DEMO_ASSETS
            .iter()
            .find(|(s, ..)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, _, price, _)| *price)
            .unwrap_or(DEFAULT_BASE_PRICE)
    }

    fn rng_for(&self, key: &str) -> StdRng {
        // FNV-1a keeps the seed stable across runs and toolchains
        let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
        StdRng::seed_from_u64(self.seed ^ hash)
    }

    /// Generate `limit` candles ending at the last closed bar before `end_ms`.
    pub fn generate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
        end_ms: i64,
    ) -> Vec<OhlcPoint> {
        let mut rng = self.rng_for(&format!("{}:{}", symbol.to_uppercase(), timeframe));
        let step_ms = timeframe.seconds() * 1000;
        let last_open = end_ms - end_ms.rem_euclid(step_ms) - step_ms;
        let period_volatility = DAILY_VOLATILITY * (timeframe.seconds() as f64 / 86_400.0).sqrt();

        let mut close = Self::base_price(symbol);
        let mut candles = Vec::with_capacity(limit);

        for i in 0..limit {
            // slight drift from bearish to bullish across the window
            let drift = if limit > 1 {
                -0.001 + 0.002 * i as f64 / (limit - 1) as f64
            } else {
                0.0
            };
            let ret = (gaussian(&mut rng) * period_volatility + drift).clamp(-0.5, 0.5);

            let open = close;
            close = open * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(1_000.0..10_000.0) * (1.0 + ret.abs() * 20.0);

            candles.push(OhlcPoint {
                time: last_open - (limit - 1 - i) as i64 * step_ms,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        candles
    }

    /// Demo market listing, ranked by market cap.
    pub fn listing(&self, limit: usize) -> Vec<MarketAsset> {
        let mut rng = self.rng_for("listing");
        DEMO_ASSETS
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, (symbol, name, price, market_cap))| {
                let stable = *symbol == "USDT";
                let change = |rng: &mut StdRng, span: f64| {
                    if stable {
                        0.0
                    } else {
                        rng.gen_range(-span..span)
                    }
                };
                MarketAsset {
                    id: name.to_lowercase(),
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    price: *price,
                    market_cap: *market_cap,
                    volume_24h: market_cap * rng.gen_range(0.02..0.15),
                    price_change_1h: change(&mut rng, 1.5),
                    price_change_24h: change(&mut rng, 12.0),
                    price_change_7d: change(&mut rng, 25.0),
                    rank: Some(i as u32 + 1),
                }
            })
            .collect()
    }
}

/// Standard normal sample (Box-Muller).
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl DataSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn get_history<'a>(
        &'a self,
        pair: &'a AssetPair,
        timeframe: Timeframe,
        limit: usize,
    ) -> SourceFuture<'a, Option<OhlcvSeries>> {
        Box::pin(async move {
            let now = chrono::Utc::now().timestamp_millis();
            let candles = self.generate(&pair.base, timeframe, limit, now);
            debug!("Generated {} demo {} candles for {}", candles.len(), timeframe, pair);
            Ok::<_, AppError>(Some(OhlcvSeries::new(candles)?))
        })
    }

    fn get_current_price<'a>(&'a self, pair: &'a AssetPair) -> SourceFuture<'a, Option<f64>> {
        Box::pin(async move { Ok(Some(Self::base_price(&pair.base))) })
    }
}

impl MarketDataSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn top_assets_by_market_cap(&self, limit: usize) -> SourceFuture<'_, Vec<MarketAsset>> {
        Box::pin(async move { Ok(self.listing(limit)) })
    }
}
