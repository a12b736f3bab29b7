//! Technical indicator implementations.
//!
//! Every indicator writes trailing series aligned with the input candles (or
//! scalar summaries) into an [`IndicatorSet`]. Values that cannot be computed,
//! because the window is not yet full or a denominator is zero, stay `None`.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod regression;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod structure;
pub mod volatility;
pub mod volume;
pub mod williams;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use macd::Macd;
pub use regression::LinearRegression;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;
pub use structure::{Fibonacci, PricePosition, SupportResistance};
pub use volatility::Volatility;
pub use volume::VolumeProfile;
pub use williams::WilliamsR;

use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint, OhlcvSeries, Series, Timeframe, TimeframeIndicators};
use std::collections::BTreeMap;
use tracing::debug;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Unique identifier for this indicator.
    fn id(&self) -> &str;

    /// Category this indicator belongs to.
    fn category(&self) -> IndicatorCategory;

    /// Minimum number of candles before the latest value can be defined.
    fn min_periods(&self) -> usize;

    /// Compute from candle data and store the result in `out`.
    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet);
}

/// Get all available indicators.
pub fn all_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        // Trend indicators
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Ema::new(12)),
        Box::new(Ema::new(26)),
        Box::new(Adx::default()),
        Box::new(LinearRegression::default()),
        // Momentum indicators
        Box::new(Macd::default()),
        Box::new(Rsi::default()),
        Box::new(Stochastic::default()),
        Box::new(WilliamsR::default()),
        // Volatility indicators
        Box::new(BollingerBands::default()),
        Box::new(Atr::default()),
        Box::new(Volatility::default()),
        // Volume indicators
        Box::new(VolumeProfile::default()),
        // Price structure
        Box::new(SupportResistance::default()),
        Box::new(Fibonacci::default()),
        Box::new(PricePosition::default()),
    ]
}

/// Runs a fixed indicator catalogue over candle histories.
pub struct IndicatorEngine {
    indicators: Vec<Box<dyn Indicator>>,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self {
            indicators: all_indicators(),
        }
    }

    /// Compute every indicator for one candle history.
    pub fn compute(&self, series: &OhlcvSeries) -> IndicatorSet {
        let candles = series.candles();
        let mut out = IndicatorSet::new(candles.len());

        for indicator in &self.indicators {
            if candles.len() < indicator.min_periods() {
                debug!(
                    "{} ({:?}) needs {} candles, have {} - values stay undefined",
                    indicator.id(),
                    indicator.category(),
                    indicator.min_periods(),
                    candles.len()
                );
            }
            indicator.apply(candles, &mut out);
        }

        out
    }

    /// Compute indicators for each timeframe's history.
    pub fn compute_timeframes(
        &self,
        histories: &BTreeMap<Timeframe, OhlcvSeries>,
    ) -> TimeframeIndicators {
        histories
            .iter()
            .map(|(tf, series)| (*tf, self.compute(series)))
            .collect()
    }
}

/// Wrap plain values as a fully defined series.
pub fn defined(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Rolling arithmetic mean. A window that contains an undefined value is
/// undefined.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |window| {
        Some(window.iter().sum::<f64>() / window.len() as f64)
    })
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[Option<f64>], period: usize) -> Series {
    if period < 2 {
        return vec![None; values.len()];
    }
    rolling(values, period, |window| {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    })
}

fn rolling<F>(values: &[Option<f64>], period: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut window = Vec::with_capacity(period);
    for i in (period - 1)..values.len() {
        window.clear();
        for value in &values[(i + 1 - period)..=i] {
            match value {
                Some(v) => window.push(*v),
                None => break,
            }
        }
        if window.len() == period {
            out[i] = f(&window);
        }
    }
    out
}

/// Recursive smoothing seeded with the mean of the first `period` defined
/// values: `next = prev + alpha * (x - prev)`. A gap restarts the seed.
fn recursive_smooth(values: &[Option<f64>], period: usize, alpha: f64) -> Series {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut prev: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_len = 0;

    for (i, value) in values.iter().enumerate() {
        match (*value, prev) {
            (Some(x), Some(p)) => {
                let next = p + alpha * (x - p);
                out[i] = Some(next);
                prev = Some(next);
            }
            (Some(x), None) => {
                seed_sum += x;
                seed_len += 1;
                if seed_len == period {
                    let seed = seed_sum / period as f64;
                    out[i] = Some(seed);
                    prev = Some(seed);
                }
            }
            (None, _) => {
                prev = None;
                seed_sum = 0.0;
                seed_len = 0;
            }
        }
    }
    out
}

/// Exponential moving average (alpha = 2 / (period + 1)).
pub fn ema_series(values: &[Option<f64>], period: usize) -> Series {
    recursive_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder's smoothing (alpha = 1 / period).
pub fn wilder_smooth(values: &[Option<f64>], period: usize) -> Series {
    recursive_smooth(values, period, 1.0 / period.max(1) as f64)
}

/// Highest high and lowest low over a candle window.
pub(crate) fn high_low(window: &[OhlcPoint]) -> (f64, f64) {
    let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    (high, low)
}
