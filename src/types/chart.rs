use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV (Open, High, Low, Close, Volume) candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcPoint {
    /// Candle open time, unix milliseconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Reasons a candle sequence is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("candle {index}: prices must be positive and finite")]
    NonPositivePrice { index: usize },

    #[error("candle {index}: volume must be non-negative and finite")]
    NegativeVolume { index: usize },

    #[error("candle {index}: high/low do not bracket open/close")]
    InvalidRange { index: usize },

    #[error("candle {index}: timestamp {time} is not after the previous candle")]
    NonIncreasingTime { index: usize, time: i64 },
}

/// Validated, time-ordered OHLCV history.
///
/// Construction checks every candle, so the indicator code can rely on
/// positive prices, `high >= max(open, close)`, `low <= min(open, close)`
/// and strictly increasing timestamps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OhlcvSeries {
    candles: Vec<OhlcPoint>,
}

impl OhlcvSeries {
    /// Validate and wrap a candle sequence.
    pub fn new(candles: Vec<OhlcPoint>) -> Result<Self, SeriesError> {
        for (index, c) in candles.iter().enumerate() {
            let prices = [c.open, c.high, c.low, c.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(SeriesError::NonPositivePrice { index });
            }
            if !c.volume.is_finite() || c.volume < 0.0 {
                return Err(SeriesError::NegativeVolume { index });
            }
            if c.high < c.open.max(c.close) || c.low > c.open.min(c.close) {
                return Err(SeriesError::InvalidRange { index });
            }
            if index > 0 && c.time <= candles[index - 1].time {
                return Err(SeriesError::NonIncreasingTime {
                    index,
                    time: c.time,
                });
            }
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[OhlcPoint] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Most recent candle.
    pub fn last(&self) -> Option<&OhlcPoint> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

impl AsRef<[OhlcPoint]> for OhlcvSeries {
    fn as_ref(&self) -> &[OhlcPoint] {
        &self.candles
    }
}
