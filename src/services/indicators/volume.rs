//! Volume indicators.

use super::{rolling_mean, Indicator};
use crate::types::{latest, IndicatorCategory, IndicatorSet, OhlcPoint, VolumeTrend};

/// Volume profile: long volume SMA, current/average ratio, rate of change
/// and the short-vs-long volume trend.
pub struct VolumeProfile {
    period: usize,
    short_period: usize,
    momentum_period: usize,
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self {
            period: 20,
            short_period: 5,
            momentum_period: 10,
        }
    }
}

impl VolumeProfile {
    pub fn new(period: usize, short_period: usize, momentum_period: usize) -> Self {
        Self {
            period,
            short_period,
            momentum_period,
        }
    }
}

impl Indicator for VolumeProfile {
    fn id(&self) -> &str {
        "volume"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
    }

    fn min_periods(&self) -> usize {
        self.period.max(self.momentum_period + 1)
    }

    fn apply(&self, candles: &[OhlcPoint], out: &mut IndicatorSet) {
        let volumes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.volume)).collect();
        let long = rolling_mean(&volumes, self.period);
        let short = rolling_mean(&volumes, self.short_period);

        let current = candles.last().map(|c| c.volume);
        let long_now = latest(&long);
        let short_now = latest(&short);

        out.volume_ratio = match (current, long_now) {
            (Some(v), Some(avg)) if avg > 0.0 => Some(v / avg),
            _ => None,
        };

        out.volume_momentum = candles
            .len()
            .checked_sub(self.momentum_period + 1)
            .map(|i| candles[i].volume)
            .filter(|past| *past > 0.0)
            .zip(current)
            .map(|(past, now)| (now - past) / past * 100.0);

        out.volume_trend = match (short_now, long_now) {
            (Some(s), Some(l)) if s > l => Some(VolumeTrend::Rising),
            (Some(s), Some(l)) if s < l => Some(VolumeTrend::Falling),
            (Some(_), Some(_)) => Some(VolumeTrend::Flat),
            _ => None,
        };

        out.volume_strength = match (short_now, long_now) {
            (Some(s), Some(l)) if l > 0.0 => Some(s / l),
            _ => None,
        };

        out.volume_sma = long;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn with_volumes(volumes: &[f64]) -> Vec<OhlcPoint> {
        let mut candles = flat_candles(volumes.len(), 10.0);
        for (c, v) in candles.iter_mut().zip(volumes) {
            c.volume = *v;
        }
        candles
    }

    #[test]
    fn test_volume_spike_ratio() {
        let mut volumes = vec![100.0; 19];
        volumes.push(300.0);
        let candles = with_volumes(&volumes);
        let mut out = IndicatorSet::new(candles.len());
        VolumeProfile::default().apply(&candles, &mut out);

        // average (19 * 100 + 300) / 20 = 110
        let ratio = out.volume_ratio.unwrap();
        assert!((ratio - 300.0 / 110.0).abs() < 1e-9);
        assert_eq!(out.volume_trend, Some(VolumeTrend::Rising));
        assert!(out.volume_strength.unwrap() > 1.0);
        assert!((out.volume_momentum.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_average_volume_is_undefined() {
        let candles = with_volumes(&[0.0; 25]);
        let mut out = IndicatorSet::new(candles.len());
        VolumeProfile::default().apply(&candles, &mut out);

        assert_eq!(out.volume_ratio, None);
        assert_eq!(out.volume_momentum, None);
        assert_eq!(out.volume_strength, None);
        assert_eq!(out.volume_trend, Some(VolumeTrend::Flat));
    }

    #[test]
    fn test_falling_volume_trend() {
        let volumes: Vec<f64> = (0..30).map(|i| 1000.0 - i as f64 * 20.0).collect();
        let candles = with_volumes(&volumes);
        let mut out = IndicatorSet::new(candles.len());
        VolumeProfile::default().apply(&candles, &mut out);

        assert_eq!(out.volume_trend, Some(VolumeTrend::Falling));
        assert!(out.volume_momentum.unwrap() < 0.0);
    }
}
