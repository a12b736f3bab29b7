//! Simple Moving Average (SMA) indicator.

use super::{rolling_mean, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// SMA (Simple Moving Average) over closes.
///
/// Stored in [`IndicatorSet::sma`] keyed by its window, so several windows
/// can coexist in one set.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    fn id(&self) -> &str {
        match self.period {
            20 => "sma_20",
            50 => "sma_50",
            _ => "sma",
        }
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let closes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.close)).collect();
        out.sma.insert(self.period, rolling_mean(&closes, self.period));
    }
}
