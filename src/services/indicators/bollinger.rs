//! Bollinger Bands indicator.

use super::{rolling_mean, rolling_std, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// Bollinger Bands: SMA of closes plus/minus a multiple of the rolling
/// standard deviation.
pub struct BollingerBands {
    period: usize,
    std_dev: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self { period, std_dev }
    }
}

impl Indicator for BollingerBands {
    fn id(&self) -> &str {
        "bollinger"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let closes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.close)).collect();
        let middle = rolling_mean(&closes, self.period);
        let std = rolling_std(&closes, self.period);

        let band = |sign: f64| -> Vec<Option<f64>> {
            middle
                .iter()
                .zip(std.iter())
                .map(|(m, s)| Some((*m)? + sign * self.std_dev * (*s)?))
                .collect()
        };

        out.bb_upper = band(1.0);
        out.bb_lower = band(-1.0);
        out.std_dev = std.last().copied().flatten();
        out.bb_middle = middle;
    }
}
