pub mod analyzer;
pub mod cache;
pub mod format;
pub mod indicators;
pub mod ranker;
pub mod screener;
pub mod signal_generator;

pub use analyzer::{AnalyzerConfig, MarketAnalyzer};
pub use cache::{Cache, CachedSource};
pub use format::format_price;
pub use indicators::IndicatorEngine;
pub use ranker::{OpportunityRanker, RankerWeights};
pub use screener::{MarketScreener, ScreenerConfig};
pub use signal_generator::{SignalConfig, SignalGenerator};
