//! Coordinator: screens the market, analyses each candidate across
//! timeframes and ranks the resulting signals.

use crate::error::{AppError, Result};
use crate::services::indicators::IndicatorEngine;
use crate::services::{MarketScreener, OpportunityRanker, SignalGenerator};
use crate::sources::{DataSource, MarketDataSource};
use crate::types::{
    AssetPair, MarketContext, OhlcvSeries, OpportunityReport, ScreenedAsset, Timeframe,
    TradingSignal,
};
use futures_util::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Quote asset pairs are formed against ("USDT").
    pub quote_asset: String,
    /// Timeframes fetched and analysed for every asset.
    pub timeframes: Vec<Timeframe>,
    /// Candles requested per timeframe.
    pub history_limit: usize,
    /// Assets analysed at the same time.
    pub max_concurrency: usize,
    /// Spacing between the start of consecutive asset analyses.
    pub request_delay: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            timeframes: Timeframe::DEFAULT_SET.to_vec(),
            history_limit: 200,
            max_concurrency: 4,
            request_delay: Duration::from_millis(100),
        }
    }
}

/// Result of one asset's analysis inside a batch.
enum AssetOutcome {
    /// Analysis completed, with or without a signal.
    Analyzed(Option<TradingSignal>),
    Failed,
}

/// Runs the full pipeline for single assets and market-wide scans.
pub struct MarketAnalyzer {
    data: Arc<dyn DataSource>,
    market: Arc<dyn MarketDataSource>,
    engine: IndicatorEngine,
    generator: SignalGenerator,
    screener: MarketScreener,
    ranker: OpportunityRanker,
    config: AnalyzerConfig,
}

impl MarketAnalyzer {
    pub fn new(
        data: Arc<dyn DataSource>,
        market: Arc<dyn MarketDataSource>,
        generator: SignalGenerator,
        screener: MarketScreener,
        ranker: OpportunityRanker,
        config: AnalyzerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            data,
            market,
            engine: IndicatorEngine::new(),
            generator,
            screener,
            ranker,
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Names of the history and listing sources, in that order.
    pub fn source_names(&self) -> (&str, &str) {
        (self.data.name(), self.market.name())
    }

    /// Analyse one asset with the data source's current price.
    ///
    /// `Ok(None)` means the asset was analysed but produced no signal.
    pub async fn analyze_symbol(&self, symbol: &str) -> Result<Option<TradingSignal>> {
        let pair = AssetPair::new(symbol, &self.config.quote_asset);
        if pair.base.is_empty() {
            return Err(AppError::BadRequest("symbol must not be empty".to_string()));
        }

        let price = self
            .data
            .get_current_price(&pair)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No price for {}", pair)))?;

        self.analyze_pair(&pair, price, MarketContext::default()).await
    }

    /// Screen the market, analyse up to `max_assets` candidates and return
    /// the `top_n` best signals.
    ///
    /// Per-asset failures (missing data, errors, panics) are logged and
    /// counted; only an empty market listing fails the whole scan.
    pub async fn find_opportunities(
        self: &Arc<Self>,
        max_assets: usize,
        top_n: usize,
    ) -> Result<OpportunityReport> {
        let started = Instant::now();
        info!(
            "Scanning top {} assets via {} / {}",
            max_assets,
            self.market.name(),
            self.data.name()
        );

        let listing = self.market.top_assets_by_market_cap(max_assets).await?;
        if listing.is_empty() {
            return Err(AppError::NoMarketData(format!(
                "{} returned no assets",
                self.market.name()
            )));
        }

        let candidates: Vec<ScreenedAsset> = self
            .screener
            .screen(listing)
            .into_iter()
            .take(max_assets)
            .collect();
        let total_candidates = candidates.len();
        info!("Analyzing {} screened candidates", total_candidates);

        let delay = self.config.request_delay;
        let outcomes: Vec<AssetOutcome> = stream::iter(candidates.into_iter().enumerate())
            .map(|(i, candidate)| {
                let analyzer = Arc::clone(self);
                async move {
                    tokio::time::sleep_until(started + delay * i as u32).await;
                    let symbol = candidate.asset.symbol.clone();
                    debug!("Progress: {}/{} - {}", i + 1, total_candidates, symbol);

                    let task = tokio::spawn(async move { analyzer.analyze_candidate(candidate).await });
                    match task.await {
                        Ok(Ok(signal)) => AssetOutcome::Analyzed(signal),
                        Ok(Err(e)) => {
                            warn!("Skipping {}: {}", symbol, e);
                            AssetOutcome::Failed
                        }
                        Err(e) => {
                            error!("Analysis of {} aborted: {}", symbol, e);
                            AssetOutcome::Failed
                        }
                    }
                }
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut signals = Vec::new();
        let mut total_analyzed = 0;
        let mut total_failed = 0;
        for outcome in outcomes {
            match outcome {
                AssetOutcome::Analyzed(signal) => {
                    total_analyzed += 1;
                    signals.extend(signal);
                }
                AssetOutcome::Failed => total_failed += 1,
            }
        }

        let total_found = signals.len();
        let ranked = self.ranker.rank(signals, top_n);
        let elapsed = started.elapsed().as_secs_f64();

        info!(
            "Scan complete: {} opportunities from {} analyzed ({} failed) in {:.2}s",
            total_found, total_analyzed, total_failed, elapsed
        );

        Ok(OpportunityReport {
            signals: ranked,
            total_candidates,
            total_analyzed,
            total_failed,
            total_found,
            analysis_time_secs: (elapsed * 100.0).round() / 100.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Analyse a screened asset, priced from the listing when possible.
    async fn analyze_candidate(&self, candidate: ScreenedAsset) -> Result<Option<TradingSignal>> {
        let asset = candidate.asset;
        let pair = AssetPair::new(&asset.symbol, &self.config.quote_asset);

        let price = if asset.price > 0.0 {
            asset.price
        } else {
            self.data
                .get_current_price(&pair)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No price for {}", pair)))?
        };

        let context = MarketContext {
            name: Some(asset.name),
            momentum_score: Some(candidate.momentum_score),
            market_cap_rank: asset.rank,
            market_cap: Some(asset.market_cap),
            volume_24h: Some(asset.volume_24h),
        };

        self.analyze_pair(&pair, price, context).await
    }

    async fn analyze_pair(
        &self,
        pair: &AssetPair,
        price: f64,
        context: MarketContext,
    ) -> Result<Option<TradingSignal>> {
        let histories = self.fetch_histories(pair).await?;
        if histories.is_empty() {
            return Err(AppError::NotFound(format!("No price history for {}", pair)));
        }

        let indicators = self.engine.compute_timeframes(&histories);
        let signal = self
            .generator
            .generate(&pair.base, price, &indicators, &self.config.timeframes)
            .map(|mut signal| {
                signal.context = context;
                signal
            });

        match &signal {
            Some(s) => debug!("{}: {} signal, confidence {}", pair, s.direction, s.confidence),
            None => debug!("{}: no clear signal", pair),
        }
        Ok(signal)
    }

    /// Fetch every configured timeframe. Unlisted or failing timeframes are
    /// skipped; the last error is returned only when nothing could be fetched.
    async fn fetch_histories(&self, pair: &AssetPair) -> Result<BTreeMap<Timeframe, OhlcvSeries>> {
        let mut histories = BTreeMap::new();
        let mut last_error = None;
        for timeframe in &self.config.timeframes {
            match self
                .data
                .get_history(pair, *timeframe, self.config.history_limit)
                .await
            {
                Ok(Some(series)) if !series.is_empty() => {
                    histories.insert(*timeframe, series);
                }
                Ok(_) => debug!("{}: no {} history", pair, timeframe),
                Err(e) => {
                    warn!("{}: skipping {} history: {}", pair, timeframe, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if histories.is_empty() => Err(e),
            _ => Ok(histories),
        }
    }
}
