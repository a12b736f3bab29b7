//! Relative Strength Index (RSI) indicator.

use super::{rolling_mean, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// RSI (Relative Strength Index) indicator.
///
/// Compares the rolling average gain to the rolling average loss over
/// `period` close-to-close changes. Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Undefined where the average loss is exactly zero.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI series aligned with `closes`.
    pub fn series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut gains = vec![None; closes.len()];
        let mut losses = vec![None; closes.len()];
        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }

        let avg_gain = rolling_mean(&gains, period);
        let avg_loss = rolling_mean(&losses, period);

        avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(gain, loss)| match (gain, loss) {
                (Some(g), Some(l)) if *l > 0.0 => {
                    let rs = g / l;
                    Some(100.0 - 100.0 / (1.0 + rs))
                }
                _ => None,
            })
            .collect()
    }
}

impl Indicator for Rsi {
    fn id(&self) -> &str {
        "rsi"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        out.rsi = Self::series(&closes, self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::latest;

    #[test]
    fn test_rsi_bounds() {
        let candles = choppy_candles(200);
        let mut out = IndicatorSet::new(candles.len());
        Rsi::default().apply(&candles, &mut out);

        let defined: Vec<f64> = out.rsi.iter().flatten().copied().collect();
        assert!(!defined.is_empty());
        assert!(defined.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_rsi_undefined_without_losses() {
        let candles = uptrend_candles(40, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        Rsi::default().apply(&candles, &mut out);

        assert!(out.rsi.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_downtrend_is_zero() {
        let candles = downtrend_candles(40, 2.0);
        let mut out = IndicatorSet::new(candles.len());
        Rsi::default().apply(&candles, &mut out);

        assert_eq!(latest(&out.rsi), Some(0.0));
    }

    #[test]
    fn test_rsi_warmup() {
        let candles = choppy_candles(14);
        let mut out = IndicatorSet::new(candles.len());
        Rsi::default().apply(&candles, &mut out);

        // 14 candles give only 13 changes
        assert!(out.rsi.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_known_value() {
        // alternating +2 / -1 changes: avg gain 1.0, avg loss 0.5 over 14 changes
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 2.0 } else { last - 1.0 });
        }
        let rsi = Rsi::series(&closes, 14);
        let value = rsi.last().copied().flatten().unwrap();
        assert!((value - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }
}
