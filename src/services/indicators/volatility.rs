//! Historical volatility of close-to-close returns.

use super::{rolling_std, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// Annualised historical volatility in percent:
/// std(returns over `period`) * sqrt(365) * 100.
pub struct Volatility {
    period: usize,
}

impl Default for Volatility {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Volatility {
    fn id(&self) -> &str {
        "volatility"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let returns: Vec<Option<f64>> = candles
            .windows(2)
            .map(|w| Some(w[1].close / w[0].close - 1.0))
            .collect();

        out.volatility = rolling_std(&returns, self.period)
            .last()
            .copied()
            .flatten()
            .map(|std| std * 365f64.sqrt() * 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_flat_prices_have_zero_volatility() {
        let candles = flat_candles(30, 10.0);
        let mut out = IndicatorSet::new(candles.len());
        Volatility::default().apply(&candles, &mut out);

        assert_eq!(out.volatility, Some(0.0));
    }

    #[test]
    fn test_volatility_needs_period_plus_one_candles() {
        let candles = choppy_candles(20);
        let mut out = IndicatorSet::new(candles.len());
        Volatility::default().apply(&candles, &mut out);
        assert_eq!(out.volatility, None);

        let candles = choppy_candles(21);
        Volatility::default().apply(&candles, &mut out);
        assert!(out.volatility.unwrap() > 0.0);
    }
}
