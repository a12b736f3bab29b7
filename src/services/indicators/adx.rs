//! Average Directional Index (ADX) indicator.

use super::atr::true_range;
use super::{wilder_smooth, Indicator};
use crate::types::{IndicatorCategory, IndicatorSet, OhlcPoint};

/// ADX (Average Directional Index) with +DI / -DI.
///
/// True range and directional movement are Wilder-smoothed; DX is the
/// normalised DI spread and ADX its Wilder average. Points where the
/// smoothed true range or the DI sum is zero stay undefined.
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Adx {
    fn id(&self) -> &str {
        "adx"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.period * 2
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let n = candles.len();
        let ranges = true_range(candles);

        let mut tr = vec![None; n];
        let mut plus_dm = vec![None; n];
        let mut minus_dm = vec![None; n];
        for i in 1..n {
            let up = candles[i].high - candles[i - 1].high;
            let down = candles[i - 1].low - candles[i].low;
            tr[i] = Some(ranges[i]);
            plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
        }

        let smoothed_tr = wilder_smooth(&tr, self.period);
        let smoothed_plus = wilder_smooth(&plus_dm, self.period);
        let smoothed_minus = wilder_smooth(&minus_dm, self.period);

        let di = |dm: &[Option<f64>]| -> Vec<Option<f64>> {
            dm.iter()
                .zip(smoothed_tr.iter())
                .map(|(dm, tr)| match (dm, tr) {
                    (Some(dm), Some(tr)) if *tr > 0.0 => Some(100.0 * dm / tr),
                    _ => None,
                })
                .collect()
        };
        let plus_di = di(&smoothed_plus);
        let minus_di = di(&smoothed_minus);

        let dx: Vec<Option<f64>> = plus_di
            .iter()
            .zip(minus_di.iter())
            .map(|(p, m)| match (p, m) {
                (Some(p), Some(m)) if p + m > 0.0 => Some(100.0 * (p - m).abs() / (p + m)),
                _ => None,
            })
            .collect();

        out.adx = wilder_smooth(&dx, self.period);
        out.plus_di = plus_di;
        out.minus_di = minus_di;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::latest;

    #[test]
    fn test_adx_strong_uptrend() {
        let candles = uptrend_candles(60, 2.0);
        let mut out = IndicatorSet::new(candles.len());
        Adx::default().apply(&candles, &mut out);

        let adx = latest(&out.adx).unwrap();
        assert!(adx > 50.0);
        assert!(latest(&out.plus_di).unwrap() > latest(&out.minus_di).unwrap());
    }

    #[test]
    fn test_adx_bounds() {
        let candles = choppy_candles(150);
        let mut out = IndicatorSet::new(candles.len());
        Adx::default().apply(&candles, &mut out);

        let values: Vec<f64> = out.adx.iter().flatten().copied().collect();
        assert!(!values.is_empty());
        assert!(values.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_adx_flat_market_is_undefined() {
        let candles = flat_candles(40, 20.0);
        let mut out = IndicatorSet::new(candles.len());
        Adx::default().apply(&candles, &mut out);

        assert!(out.adx.iter().all(Option::is_none));
        assert!(out.plus_di.iter().all(Option::is_none));
    }
}
