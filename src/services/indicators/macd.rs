//! Moving Average Convergence Divergence (MACD) indicator.

use super::{ema_series, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// MACD indicator.
///
/// - MACD Line = fast EMA - slow EMA
/// - Signal Line = EMA of the MACD line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }
}

impl Indicator for Macd {
    fn id(&self) -> &str {
        "macd"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.slow + self.signal - 1
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let closes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.close)).collect();
        let fast = ema_series(&closes, self.fast);
        let slow = ema_series(&closes, self.slow);

        let line: Vec<Option<f64>> = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();
        let signal = ema_series(&line, self.signal);
        let histogram = line
            .iter()
            .zip(signal.iter())
            .map(|(l, s)| Some((*l)? - (*s)?))
            .collect();

        out.macd_line = line;
        out.macd_signal = signal;
        out.macd_histogram = histogram;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::latest;

    #[test]
    fn test_macd_warmup() {
        let candles = choppy_candles(40);
        let mut out = IndicatorSet::new(candles.len());
        Macd::default().apply(&candles, &mut out);

        assert_eq!(out.macd_line[24], None);
        assert!(out.macd_line[25].is_some());
        assert_eq!(out.macd_signal[32], None);
        assert!(out.macd_signal[33].is_some());
        assert!(out.macd_histogram[33].is_some());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let candles = uptrend_candles(80, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        Macd::default().apply(&candles, &mut out);

        assert!(latest(&out.macd_line).unwrap() > 0.0);
    }

    #[test]
    fn test_macd_histogram_is_line_minus_signal() {
        let candles = choppy_candles(100);
        let mut out = IndicatorSet::new(candles.len());
        Macd::default().apply(&candles, &mut out);

        let line = latest(&out.macd_line).unwrap();
        let signal = latest(&out.macd_signal).unwrap();
        let hist = latest(&out.macd_histogram).unwrap();
        assert!((hist - (line - signal)).abs() < 1e-12);
    }
}
