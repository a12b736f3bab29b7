//! Stochastic Oscillator indicator.

use super::{high_low, rolling_mean, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// Stochastic Oscillator.
///
/// %K = (close - lowest low) / (highest high - lowest low) * 100
/// %D = SMA of %K
///
/// %K is undefined where the high/low range is zero.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }
}

impl Indicator for Stochastic {
    fn id(&self) -> &str {
        "stochastic"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let mut k = vec![None; candles.len()];
        if self.k_period > 0 && candles.len() >= self.k_period {
            for i in (self.k_period - 1)..candles.len() {
                let (high, low) = high_low(&candles[(i + 1 - self.k_period)..=i]);
                let range = high - low;
                if range > 0.0 {
                    k[i] = Some(((candles[i].close - low) / range * 100.0).clamp(0.0, 100.0));
                }
            }
        }

        out.stoch_d = rolling_mean(&k, self.d_period);
        out.stoch_k = k;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_stochastic_bounds() {
        let candles = choppy_candles(150);
        let mut out = IndicatorSet::new(candles.len());
        Stochastic::default().apply(&candles, &mut out);

        let k: Vec<f64> = out.stoch_k.iter().flatten().copied().collect();
        let d: Vec<f64> = out.stoch_d.iter().flatten().copied().collect();
        assert!(!k.is_empty() && !d.is_empty());
        assert!(k.iter().all(|v| (0.0..=100.0).contains(v)));
        assert!(d.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_stochastic_flat_range_is_undefined() {
        let candles = flat_candles(20, 10.0);
        let mut out = IndicatorSet::new(candles.len());
        Stochastic::default().apply(&candles, &mut out);

        assert!(out.stoch_k.iter().all(Option::is_none));
        assert!(out.stoch_d.iter().all(Option::is_none));
    }
}
