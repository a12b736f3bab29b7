//! Exponential Moving Average (EMA) indicator.

use super::{ema_series, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// EMA (Exponential Moving Average) over closes.
///
/// Seeded with the SMA of the first `period` closes; undefined before that.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Ema {
    fn id(&self) -> &str {
        match self.period {
            12 => "ema_12",
            26 => "ema_26",
            _ => "ema",
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
        out.ema.insert(self.period, ema_series(&closes, self.period));
    }
}
