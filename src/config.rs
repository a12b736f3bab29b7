use crate::services::{AnalyzerConfig, ScreenerConfig, SignalConfig};
use crate::types::Timeframe;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where candle history and the market listing come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// Binance klines + CoinGecko listing.
    Binance,
    /// Seeded offline random walks.
    Demo,
}

impl DataSourceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "binance" | "live" => Some(Self::Binance),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_source: DataSourceKind,
    pub coingecko_api_key: Option<String>,
    pub binance_api_key: Option<String>,
    /// Quote asset pairs are formed against.
    pub quote_asset: String,
    pub timeframes: Vec<Timeframe>,
    /// Candles fetched per timeframe.
    pub history_limit: usize,
    /// History cache TTL; zero disables caching.
    pub cache_ttl: Duration,
    pub request_delay: Duration,
    pub max_concurrency: usize,
    pub default_max_assets: usize,
    pub default_top_n: usize,
    pub max_confidence_per_timeframe: u32,
    pub agreement_threshold: f64,
    pub min_volume_usd: f64,
    pub min_market_cap_usd: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup; unset or unparsable values
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: T) -> T {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        }
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        let timeframes = lookup("TIMEFRAMES")
            .map(|s| Timeframe::parse_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| Timeframe::DEFAULT_SET.to_vec());

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(lookup, "PORT", 3001),
            data_source: lookup("DATA_SOURCE")
                .and_then(|s| DataSourceKind::from_str(&s))
                .unwrap_or(DataSourceKind::Binance),
            coingecko_api_key: lookup("COINGECKO_API_KEY").filter(|k| !k.is_empty()),
            binance_api_key: lookup("BINANCE_API_KEY").filter(|k| !k.is_empty()),
            quote_asset: lookup("QUOTE_ASSET")
                .map(|q| q.trim().to_uppercase())
                .filter(|q| !q.is_empty())
                .unwrap_or_else(|| "USDT".to_string()),
            timeframes,
            history_limit: parsed(lookup, "HISTORY_LIMIT", 200),
            cache_ttl: Duration::from_secs(parsed(lookup, "CACHE_TTL_SECS", 300)),
            request_delay: Duration::from_millis(parsed(lookup, "REQUEST_DELAY_MS", 100)),
            max_concurrency: parsed(lookup, "MAX_CONCURRENCY", 4usize).max(1),
            default_max_assets: parsed(lookup, "DEFAULT_MAX_ASSETS", 30),
            default_top_n: parsed(lookup, "DEFAULT_TOP_N", 5),
            max_confidence_per_timeframe: parsed(lookup, "MAX_CONFIDENCE_PER_TIMEFRAME", 10u32)
                .max(1),
            agreement_threshold: parsed(lookup, "AGREEMENT_THRESHOLD", 0.6f64).clamp(0.0, 1.0),
            min_volume_usd: parsed(lookup, "MIN_VOLUME_USD", 1_000_000.0),
            min_market_cap_usd: parsed(lookup, "MIN_MARKET_CAP_USD", 10_000_000.0),
        }
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            max_confidence_per_timeframe: self.max_confidence_per_timeframe,
            agreement_threshold: self.agreement_threshold,
        }
    }

    pub fn screener_config(&self) -> ScreenerConfig {
        ScreenerConfig {
            min_volume_usd: self.min_volume_usd,
            min_market_cap_usd: self.min_market_cap_usd,
            ..Default::default()
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            quote_asset: self.quote_asset.clone(),
            timeframes: self.timeframes.clone(),
            history_limit: self.history_limit,
            max_concurrency: self.max_concurrency,
            request_delay: self.request_delay,
        }
    }
}
