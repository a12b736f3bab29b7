//! Price structure: support/resistance, Fibonacci retracements and price
//! position inside the recent range.

use super::{high_low, Indicator};
use crate::types::{FibonacciLevels, IndicatorCategory, IndicatorSet, OhlcPoint};

/// Retracement ratios measured down from the high.
pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

fn tail(candles: &[OhlcPoint], period: usize) -> &[OhlcPoint] {
    &candles[candles.len().saturating_sub(period)..]
}

/// Support = lowest low, resistance = highest high over the last `period`
/// candles (or all candles when fewer are available).
pub struct SupportResistance {
    period: usize,
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self { period: 50 }
    }
}

impl SupportResistance {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for SupportResistance {
    fn id(&self) -> &str {
        "support_resistance"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Structure
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        if candles.is_empty() {
            return;
        }
        let (high, low) = high_low(tail(candles, self.period));
        out.support = Some(low);
        out.resistance = Some(high);
    }
}

/// Fibonacci retracement levels between the recent high and low.
pub struct Fibonacci {
    period: usize,
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self { period: 50 }
    }
}

impl Fibonacci {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Levels for a high/low pair and the current price. `None` when the
    /// range is empty.
    pub fn levels(high: f64, low: f64, price: f64) -> Option<FibonacciLevels> {
        let diff = high - low;
        if diff <= 0.0 {
            return None;
        }

        let levels: Vec<(f64, f64)> = FIBONACCI_RATIOS
            .iter()
            .map(|ratio| (*ratio, high - ratio * diff))
            .collect();

        let (nearest_ratio, nearest_price) = levels
            .iter()
            .copied()
            .min_by(|a, b| (a.1 - price).abs().total_cmp(&(b.1 - price).abs()))?;

        Some(FibonacciLevels {
            high,
            low,
            levels,
            nearest_ratio,
            nearest_price,
            retracement_pct: (high - price) / diff * 100.0,
        })
    }
}

impl Indicator for Fibonacci {
    fn id(&self) -> &str {
        "fibonacci"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Structure
    }

    fn min_periods(&self) -> usize {
        2
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let Some(last) = candles.last() else {
            return;
        };
        let (high, low) = high_low(tail(candles, self.period));
        out.fibonacci = Self::levels(high, low, last.close);
    }
}

/// Where the close sits in the recent high/low range: 0 at the low, 1 at
/// the high. Undefined for a zero range.
pub struct PricePosition {
    period: usize,
}

impl Default for PricePosition {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl PricePosition {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for PricePosition {
    fn id(&self) -> &str {
        "price_position"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Structure
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let Some(last) = candles.last() else {
            return;
        };
        let (high, low) = high_low(tail(candles, self.period));
        let range = high - low;
        out.price_position = if range > 0.0 {
            Some(((last.close - low) / range).clamp(0.0, 1.0))
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_support_resistance_uses_last_50() {
        let candles = uptrend_candles(80, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        SupportResistance::default().apply(&candles, &mut out);

        // bar 30 is the first of the last 50: base 130, low 129
        assert_eq!(out.support, Some(129.0));
        // bar 79: base 179, high 181
        assert_eq!(out.resistance, Some(181.0));
    }

    #[test]
    fn test_support_resistance_short_history() {
        let candles = uptrend_candles(3, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        SupportResistance::default().apply(&candles, &mut out);

        assert_eq!(out.support, Some(99.0));
        assert_eq!(out.resistance, Some(104.0));
    }

    #[test]
    fn test_fibonacci_levels() {
        let fib = Fibonacci::levels(200.0, 100.0, 140.0).unwrap();

        assert_eq!(fib.levels.len(), 7);
        assert_eq!(fib.levels[0], (0.0, 200.0));
        assert_eq!(fib.levels[6], (1.0, 100.0));
        assert!((fib.levels[4].1 - 138.2).abs() < 1e-9);
        assert_eq!(fib.nearest_ratio, 0.618);
        assert!((fib.retracement_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_fibonacci_empty_range() {
        assert!(Fibonacci::levels(10.0, 10.0, 10.0).is_none());
    }

    #[test]
    fn test_price_position() {
        let candles = uptrend_candles(30, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        PricePosition::default().apply(&candles, &mut out);

        let position = out.price_position.unwrap();
        assert!(position > 0.9 && position <= 1.0);

        let flat = flat_candles(30, 5.0);
        PricePosition::default().apply(&flat, &mut out);
        assert_eq!(out.price_position, None);
    }
}
