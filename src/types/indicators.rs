use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Timeframe;

/// Indicator values aligned with the input candles; `None` marks an index
/// where the indicator is undefined (warm-up or degenerate arithmetic).
pub type Series = Vec<Option<f64>>;

/// Value at the most recent index, if defined.
pub fn latest(series: &Series) -> Option<f64> {
    series.last().copied().flatten()
}

/// Value one bar before the most recent, if defined.
pub fn previous(series: &Series) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    series[series.len() - 2]
}

/// Indicator sets for each analysed timeframe of one asset.
pub type TimeframeIndicators = BTreeMap<Timeframe, IndicatorSet>;

/// Family an indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Structure,
}

/// Direction of traded volume, from a short volume SMA against a long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Rising,
    Flat,
    Falling,
}

impl VolumeTrend {
    pub fn sign(&self) -> i8 {
        match self {
            Self::Rising => 1,
            Self::Flat => 0,
            Self::Falling => -1,
        }
    }
}

/// Least-squares line through the trailing closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearTrend {
    /// Price change per bar.
    pub slope: f64,
    /// Coefficient of determination; undefined for a flat window.
    pub r_squared: Option<f64>,
    /// Fitted value one bar past the window.
    pub prediction: f64,
}

/// Fibonacci retracement levels between a recent high and low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    /// (ratio, price) pairs from 0.0 (the high) to 1.0 (the low).
    pub levels: Vec<(f64, f64)>,
    /// Ratio of the level closest to the current price.
    pub nearest_ratio: f64,
    pub nearest_price: f64,
    /// How far price has retraced from the high, in percent.
    pub retracement_pct: f64,
}

/// All indicators computed for one timeframe of one asset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    /// Number of candles the set was computed from.
    pub len: usize,
    /// Simple moving averages keyed by window.
    pub sma: BTreeMap<usize, Series>,
    /// Exponential moving averages keyed by window.
    pub ema: BTreeMap<usize, Series>,
    pub rsi: Series,
    pub macd_line: Series,
    pub macd_signal: Series,
    pub macd_histogram: Series,
    pub bb_upper: Series,
    pub bb_middle: Series,
    pub bb_lower: Series,
    pub stoch_k: Series,
    pub stoch_d: Series,
    pub williams_r: Series,
    pub atr: Series,
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
    pub volume_sma: Series,
    pub volume_ratio: Option<f64>,
    pub volume_momentum: Option<f64>,
    pub volume_trend: Option<VolumeTrend>,
    pub volume_strength: Option<f64>,
    pub std_dev: Option<f64>,
    /// Annualised volatility of returns, in percent.
    pub volatility: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub fibonacci: Option<FibonacciLevels>,
    pub linear_trend: Option<LinearTrend>,
    pub price_position: Option<f64>,
}

impl IndicatorSet {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Default::default()
        }
    }

    /// Look up a series-valued indicator by name ("sma_20", "ema_12", "rsi", ...).
    pub fn series(&self, name: &str) -> Option<&Series> {
        if let Some(window) = name.strip_prefix("sma_") {
            return self.sma.get(&window.parse().ok()?);
        }
        if let Some(window) = name.strip_prefix("ema_") {
            return self.ema.get(&window.parse().ok()?);
        }
        let series = match name {
            "rsi" => &self.rsi,
            "macd_line" => &self.macd_line,
            "macd_signal" => &self.macd_signal,
            "macd_histogram" => &self.macd_histogram,
            "bb_upper" => &self.bb_upper,
            "bb_middle" => &self.bb_middle,
            "bb_lower" => &self.bb_lower,
            "stoch_k" => &self.stoch_k,
            "stoch_d" => &self.stoch_d,
            "williams_r" => &self.williams_r,
            "atr" => &self.atr,
            "adx" => &self.adx,
            "plus_di" => &self.plus_di,
            "minus_di" => &self.minus_di,
            "volume_sma" => &self.volume_sma,
            _ => return None,
        };
        Some(series)
    }

    /// Look up a scalar summary by name ("volatility", "support", ...).
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match name {
            "volume_ratio" => self.volume_ratio,
            "volume_momentum" => self.volume_momentum,
            "volume_trend" => self.volume_trend.map(|t| t.sign() as f64),
            "volume_strength" => self.volume_strength,
            "std_dev" => self.std_dev,
            "volatility" => self.volatility,
            "support" => self.support,
            "resistance" => self.resistance,
            "price_position" => self.price_position,
            "trend_slope" => self.linear_trend.map(|t| t.slope),
            "trend_r_squared" => self.linear_trend.and_then(|t| t.r_squared),
            "trend_prediction" => self.linear_trend.map(|t| t.prediction),
            "retracement_pct" => self.fibonacci.as_ref().map(|f| f.retracement_pct),
            _ => self.series(name).and_then(latest),
        }
    }

    /// Latest value of every named indicator, for display and logging.
    pub fn snapshot(&self) -> BTreeMap<String, Option<f64>> {
        const NAMES: &[&str] = &[
            "rsi",
            "macd_line",
            "macd_signal",
            "macd_histogram",
            "bb_upper",
            "bb_middle",
            "bb_lower",
            "stoch_k",
            "stoch_d",
            "williams_r",
            "atr",
            "adx",
            "plus_di",
            "minus_di",
            "volume_sma",
            "volume_ratio",
            "volume_momentum",
            "volume_trend",
            "volume_strength",
            "std_dev",
            "volatility",
            "support",
            "resistance",
            "price_position",
            "trend_slope",
            "trend_r_squared",
            "trend_prediction",
            "retracement_pct",
        ];

        let mut out: BTreeMap<String, Option<f64>> = NAMES
            .iter()
            .map(|name| (name.to_string(), self.scalar(name)))
            .collect();
        for (window, series) in &self.sma {
            out.insert(format!("sma_{}", window), latest(series));
        }
        for (window, series) in &self.ema {
            out.insert(format!("ema_{}", window), latest(series));
        }
        out
    }
}
