//! Average True Range (ATR) indicator.

use super::{wilder_smooth, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// ATR (Average True Range), Wilder-smoothed.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

/// True range of each candle; the first candle has no previous close and
/// uses its own high - low.
pub(crate) fn true_range(candles: &[OhlcPoint]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            if i == 0 {
                return hl;
            }
            let prev_close = candles[i - 1].close;
            hl.max((c.high - prev_close).abs())
                .max((c.low - prev_close).abs())
        })
        .collect()
}

impl Indicator for Atr {
    fn id(&self) -> &str {
        "atr"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let tr: Vec<Option<f64>> = true_range(candles).into_iter().map(Some).collect();
        out.atr = wilder_smooth(&tr, self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::latest;

    #[test]
    fn test_true_range_uses_previous_close() {
        let candles = vec![
            OhlcPoint { time: 1, open: 10.0, high: 11.0, low: 9.0, close: 10.0, volume: 1.0 },
            OhlcPoint { time: 2, open: 14.0, high: 15.0, low: 13.5, close: 14.0, volume: 1.0 },
        ];
        assert_eq!(true_range(&candles), vec![2.0, 5.0]);
    }

    #[test]
    fn test_atr_constant_range() {
        let candles = uptrend_candles(30, 1.0);
        let mut out = IndicatorSet::new(candles.len());
        Atr::default().apply(&candles, &mut out);

        // every bar spans step + 2 and gaps stay inside it
        let atr = latest(&out.atr).unwrap();
        assert!((atr - 3.0).abs() < 1e-9);
        assert_eq!(out.atr[12], None);
    }
}
