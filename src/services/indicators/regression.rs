//! Least-squares linear trend over the trailing closes.

use super::Indicator;
use crate::types::{IndicatorCategory, IndicatorSet, LinearTrend, OhlcPoint};

/// Linear regression of close against bar index over the last `period`
/// candles: slope, R² and the fitted value one bar ahead.
pub struct LinearRegression {
    period: usize,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl LinearRegression {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Fit `values` against 0..n. Needs at least two points.
    pub fn fit(values: &[f64]) -> Option<LinearTrend> {
        let n = values.len();
        if n < 2 {
            return None;
        }

        let nf = n as f64;
        let mean_x = (nf - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / nf;

        let mut ss_xy = 0.0;
        let mut ss_xx = 0.0;
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            ss_xy += dx * (y - mean_y);
            ss_xx += dx * dx;
        }

        let slope = ss_xy / ss_xx;
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = values.iter().map(|y| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();
        let r_squared = if ss_tot > 0.0 {
            Some(1.0 - ss_res / ss_tot)
        } else {
            None
        };

        Some(LinearTrend {
            slope,
            r_squared,
            prediction: intercept + slope * nf,
        })
    }
}

impl Indicator for LinearRegression {
    fn id(&self) -> &str {
        "linear_trend"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        if candles.len() < self.period {
            out.linear_trend = None;
            return;
        }
        let closes: Vec<f64> = candles[candles.len() - self.period..]
            .iter()
            .map(|c| c.close)
            .collect();
        out.linear_trend = Self::fit(&closes);
    }
}
