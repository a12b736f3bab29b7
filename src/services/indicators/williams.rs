//! Williams %R indicator.

use super::{high_low, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// Williams %R: (highest high - close) / (highest high - lowest low) * -100.
///
/// Ranges from -100 (at the low) to 0 (at the high); undefined where the
/// range is zero.
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for WilliamsR {
    fn id(&self) -> &str {
        "williams_r"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let mut values = vec![None; candles.len()];
        if self.period > 0 && candles.len() >= self.period {
            for i in (self.period - 1)..candles.len() {
                let (high, low) = high_low(&candles[(i + 1 - self.period)..=i]);
                let range = high - low;
                if range > 0.0 {
                    let r = (high - candles[i].close) / range * -100.0;
                    values[i] = Some(r.clamp(-100.0, 0.0));
                }
            }
        }
        out.williams_r = values;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::latest;

    #[test]
    fn test_williams_bounds() {
        let candles = choppy_candles(150);
        let mut out = IndicatorSet::new(candles.len());
        WilliamsR::default().apply(&candles, &mut out);

        let values: Vec<f64> = out.williams_r.iter().flatten().copied().collect();
        assert!(!values.is_empty());
        assert!(values.iter().all(|v| (-100.0..=0.0).contains(v)));
    }

    #[test]
    fn test_williams_near_zero_at_highs() {
        let candles = uptrend_candles(30, 2.0);
        let mut out = IndicatorSet::new(candles.len());
        WilliamsR::default().apply(&candles, &mut out);

        // close sits one point below the high in every bar
        let value = latest(&out.williams_r).unwrap();
        assert!(value > -10.0);
    }
}
