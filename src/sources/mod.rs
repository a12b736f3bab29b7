//! Market data sources.
//!
//! Candle history and spot prices come through [`DataSource`]; the
//! market-cap listing used by the screener comes through
//! [`MarketDataSource`]. Both are object-safe so the analyzer can be wired
//! with live exchange clients, the demo generator or in-memory fakes.

pub mod binance;
pub mod coingecko;
pub mod demo;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
pub use demo::DemoSource;

use crate::error::AppError;
use crate::types::{AssetPair, MarketAsset, OhlcvSeries, Timeframe};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by source trait methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Characters of an upstream error body kept in logs.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Leading part of an upstream error body, cut on a character boundary.
pub(crate) fn error_excerpt(text: &str) -> String {
    text.chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Candle history and spot price provider.
pub trait DataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Up to `limit` most recent candles, oldest first. `Ok(None)` when the
    /// pair is not listed.
    fn get_history<'a>(
        &'a self,
        pair: &'a AssetPair,
        timeframe: Timeframe,
        limit: usize,
    ) -> SourceFuture<'a, Option<OhlcvSeries>>;

    /// Latest traded price. `Ok(None)` when the pair is not listed.
    fn get_current_price<'a>(&'a self, pair: &'a AssetPair) -> SourceFuture<'a, Option<f64>>;
}

/// Market-cap ordered listing provider.
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;

    /// The `limit` largest assets by market cap, largest first.
    fn top_assets_by_market_cap(&self, limit: usize) -> SourceFuture<'_, Vec<MarketAsset>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_excerpt_short_body() {
        assert_eq!(error_excerpt("rate limited"), "rate limited");
    }

    #[test]
    fn test_error_excerpt_multibyte_body() {
        // byte 200 falls inside a three-byte character
        let body = format!("a{}", "€".repeat(150));
        let excerpt = error_excerpt(&body);
        assert_eq!(excerpt.chars().count(), ERROR_EXCERPT_CHARS);
        assert!(excerpt.starts_with("a€"));
    }
}
