//! Market screener: narrows the market-cap listing to liquid, active assets
//! worth a full technical analysis.

use crate::types::{MarketAsset, ScreenedAsset};
use tracing::debug;

/// Stablecoins and wrapped staking tokens, which never produce useful
/// directional signals.
pub const EXCLUDED_SYMBOLS: &[&str] = &[
    "USDT", "USDC", "BUSD", "DAI", "TUSD", "USDP", "USDD", "FRAX", "FDUSD", "PYUSD", "USDE",
    "STETH", "WSTETH", "WEETH", "WBETH", "WBTC", "BSC-USD",
];

/// Minimum criteria (out of five) an asset must meet.
pub const MIN_CRITERIA: u8 = 3;

/// Screening thresholds.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Pre-filter: minimum 24h volume in USD.
    pub min_volume_usd: f64,
    /// Pre-filter: minimum market cap in USD.
    pub min_market_cap_usd: f64,
    /// Criterion: market cap considered established.
    pub stable_market_cap_usd: f64,
    /// Criterion: minimum momentum score.
    pub min_momentum: f64,
    /// Criterion: minimum volume / market cap turnover.
    pub min_turnover: f64,
    /// Criterion: minimum unit price.
    pub min_price: f64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_volume_usd: 1_000_000.0,
            min_market_cap_usd: 10_000_000.0,
            stable_market_cap_usd: 50_000_000.0,
            min_momentum: 55.0,
            min_turnover: 0.05,
            min_price: 0.001,
        }
    }
}

pub fn is_excluded(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    EXCLUDED_SYMBOLS.contains(&upper.as_str())
}

/// Momentum score in 0..=100, rounded to two decimals. 50 is neutral.
pub fn momentum_score(asset: &MarketAsset) -> f64 {
    let turnover = if asset.market_cap > 0.0 {
        (asset.volume_24h / asset.market_cap * 100.0).min(10.0)
    } else {
        0.0
    };
    let price_momentum = (asset.price_change_24h * 0.7 + asset.price_change_7d * 0.3) / 2.0;

    let score = price_momentum * 0.6 + turnover * 0.3 + asset.price_change_24h.abs().min(20.0) * 0.1;
    let score = (score + 50.0).clamp(0.0, 100.0);
    (score * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct MarketScreener {
    config: ScreenerConfig,
}

impl MarketScreener {
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    /// Liquidity, size and price pre-filter plus the exclusion list.
    pub fn passes_prefilter(&self, asset: &MarketAsset) -> bool {
        asset.volume_24h > self.config.min_volume_usd
            && asset.market_cap > self.config.min_market_cap_usd
            && asset.price > 0.0
            && !is_excluded(&asset.symbol)
    }

    /// Number of screening criteria met (0-5).
    pub fn criteria_met(&self, asset: &MarketAsset, momentum: f64) -> u8 {
        let c = &self.config;
        let change = asset.price_change_24h.abs();
        let turnover = if asset.market_cap > 0.0 {
            asset.volume_24h / asset.market_cap
        } else {
            0.0
        };

        [
            momentum > c.min_momentum,
            (1.0..=15.0).contains(&change),
            turnover > c.min_turnover,
            asset.market_cap > c.stable_market_cap_usd,
            asset.price > c.min_price,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }

    /// Screen a listing: survivors sorted by momentum, highest first.
    pub fn screen(&self, assets: Vec<MarketAsset>) -> Vec<ScreenedAsset> {
        let total = assets.len();
        let mut screened: Vec<ScreenedAsset> = assets
            .into_iter()
            .filter(|asset| self.passes_prefilter(asset))
            .filter_map(|asset| {
                let momentum = momentum_score(&asset);
                let criteria = self.criteria_met(&asset, momentum);
                (criteria >= MIN_CRITERIA).then_some(ScreenedAsset {
                    asset,
                    momentum_score: momentum,
                    criteria_met: criteria,
                })
            })
            .collect();

        screened.sort_by(|a, b| b.momentum_score.total_cmp(&a.momentum_score));
        debug!("Screened {} of {} assets", screened.len(), total);
        screened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(symbol: &str, price: f64, mcap: f64, volume: f64, chg24: f64, chg7d: f64) -> MarketAsset {
        MarketAsset {
            id: symbol.to_lowercase(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            price,
            market_cap: mcap,
            volume_24h: volume,
            price_change_1h: 0.0,
            price_change_24h: chg24,
            price_change_7d: chg7d,
            rank: Some(1),
        }
    }

    #[test]
    fn test_momentum_score_formula() {
        let a = asset("AAA", 10.0, 1e9, 1e8, 10.0, 20.0);
        // price momentum (7 + 6) / 2 = 6.5 -> 3.9; turnover 10 -> 3.0; |24h| 10 -> 1.0
        assert_eq!(momentum_score(&a), 57.9);
    }

    #[test]
    fn test_momentum_score_is_clamped() {
        let crash = asset("CRS", 1.0, 1e9, 1e7, -300.0, -300.0);
        assert_eq!(momentum_score(&crash), 0.0);
        let moon = asset("MOON", 1.0, 1e9, 1e7, 300.0, 300.0);
        assert_eq!(momentum_score(&moon), 100.0);
    }

    #[test]
    fn test_stablecoins_are_excluded() {
        let screener = MarketScreener::default();
        let usdt = asset("usdt", 1.0, 1e11, 5e10, 0.0, 0.0);
        assert!(!screener.passes_prefilter(&usdt));
        assert!(is_excluded("stETH"));
        assert!(!is_excluded("BTC"));
    }

    #[test]
    fn test_prefilter_thresholds() {
        let screener = MarketScreener::default();
        assert!(!screener.passes_prefilter(&asset("LOWV", 1.0, 1e9, 5e5, 2.0, 2.0)));
        assert!(!screener.passes_prefilter(&asset("SMALL", 1.0, 5e6, 5e6, 2.0, 2.0)));
        assert!(!screener.passes_prefilter(&asset("ZERO", 0.0, 1e9, 5e7, 2.0, 2.0)));
        assert!(screener.passes_prefilter(&asset("OK", 1.0, 1e9, 5e7, 2.0, 2.0)));
    }

    #[test]
    fn test_screen_requires_three_criteria_and_sorts() {
        let screener = MarketScreener::default();
        let assets = vec![
            // meets market cap and price only
            asset("FLAT", 1.0, 1e9, 2e6, 0.0, 0.0),
            // momentum, change, turnover, market cap, price
            asset("HOT", 5.0, 1e9, 1e8, 10.0, 20.0),
            // change, market cap, price
            asset("WARM", 5.0, 1e9, 2e7, 3.0, 1.0),
        ];

        let screened = screener.screen(assets);
        let symbols: Vec<&str> = screened.iter().map(|s| s.asset.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["HOT", "WARM"]);
        assert_eq!(screened[0].criteria_met, 5);
        assert!(screened[0].momentum_score > screened[1].momentum_score);
    }
}
