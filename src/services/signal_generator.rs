//! Multi-timeframe signal generation.
//!
//! Each timeframe's indicators cast directional votes; timeframes that agree
//! strongly enough produce a trade with entry, four take-profit targets, two
//! stops and a leverage suggestion taken from the primary timeframe.

use crate::types::{
    latest, previous, Bias, Direction, IndicatorSet, MarketContext, Timeframe,
    TimeframeAnalysis, TimeframeIndicators, TradingSignal, Vote, VoteSource,
};
use tracing::{debug, warn};

/// Fibonacci multiples of the base distance for TP1..TP4.
pub const TAKE_PROFIT_RATIOS: [f64; 4] = [0.618, 1.0, 1.618, 2.618];

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_NEUTRAL_LOW: f64 = 40.0;
const RSI_NEUTRAL_HIGH: f64 = 60.0;
const HIGH_VOLUME_RATIO: f64 = 1.5;

const SMA_SHORT: usize = 20;
const SMA_LONG: usize = 50;
const EMA_SHORT: usize = 12;
const EMA_LONG: usize = 26;

/// Volatility (%) assumed when the primary timeframe has none.
const DEFAULT_VOLATILITY: f64 = 10.0;

/// Tunables for the signal generator.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Confidence points one timeframe can contribute at most.
    pub max_confidence_per_timeframe: u32,
    /// Share of directional timeframes that must agree (0-1).
    pub agreement_threshold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            max_confidence_per_timeframe: 10,
            agreement_threshold: 0.6,
        }
    }
}

/// Votes and confidence points collected on one timeframe.
#[derive(Debug, Default)]
struct VoteTally {
    votes: Vec<Vote>,
    confidence: u32,
}

impl VoteTally {
    fn cast(&mut self, source: VoteSource, direction: Direction, weight: u32) {
        self.votes.push(Vote {
            source,
            direction,
            weight,
        });
        self.confidence += weight;
    }

    fn add_confidence(&mut self, points: u32) {
        self.confidence += points;
    }

    /// Majority of votes cast; a tie (including no votes) is neutral.
    fn bias(&self) -> Bias {
        let longs = self
            .votes
            .iter()
            .filter(|v| v.direction == Direction::Long)
            .count();
        let shorts = self.votes.len() - longs;
        match longs.cmp(&shorts) {
            std::cmp::Ordering::Greater => Bias::Long,
            std::cmp::Ordering::Less => Bias::Short,
            std::cmp::Ordering::Equal => Bias::Neutral,
        }
    }
}

/// Combines per-timeframe indicators into a trading signal.
#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Generate a signal, or `None` when the timeframes do not agree on a
    /// direction or the resulting levels are unusable.
    ///
    /// Timeframes listed in `timeframes` but absent from `indicators` are
    /// skipped.
    pub fn generate(
        &self,
        symbol: &str,
        current_price: f64,
        indicators: &TimeframeIndicators,
        timeframes: &[Timeframe],
    ) -> Option<TradingSignal> {
        if !(current_price > 0.0) || !current_price.is_finite() {
            debug!("{}: no usable current price ({})", symbol, current_price);
            return None;
        }

        let analyses: Vec<TimeframeAnalysis> = timeframes
            .iter()
            .filter_map(|tf| {
                let set = indicators.get(tf)?;
                Some(analyze_timeframe(*tf, set, current_price))
            })
            .collect();

        if analyses.is_empty() {
            debug!("{}: no indicator sets for requested timeframes", symbol);
            return None;
        }

        let biases: Vec<Bias> = analyses.iter().map(|a| a.bias).collect();
        let Some(direction) = overall_bias(&biases, self.config.agreement_threshold).direction()
        else {
            debug!("{}: no clear direction across {:?}", symbol, biases);
            return None;
        };

        let primary_tf = primary_timeframe(indicators, timeframes)?;
        let primary = indicators.get(&primary_tf)?;

        let entry = entry_price(current_price, direction, primary.support, primary.resistance);

        let volatility = primary.volatility.unwrap_or(DEFAULT_VOLATILITY);
        let std_dev = primary.std_dev.unwrap_or(entry * 0.02);
        let base = base_distance(entry, volatility, std_dev);
        let [tp1, tp2, tp3, tp4] = take_profits(entry, direction, base);

        let (mut stop_loss, safe_stop_loss) =
            stop_losses(entry, direction, primary.support, primary.resistance, volatility);
        if (entry - stop_loss) * direction.sign() <= 0.0 {
            debug!(
                "{}: structural stop {} on the wrong side of entry {}, using safe stop",
                symbol, stop_loss, entry
            );
            stop_loss = safe_stop_loss;
        }

        let signal = TradingSignal {
            symbol: symbol.to_string(),
            direction,
            entry,
            tp1,
            tp2,
            tp3,
            tp4,
            stop_loss,
            safe_stop_loss,
            leverage: leverage(volatility),
            confidence: confidence(&analyses, self.config.max_confidence_per_timeframe),
            timeframes: analyses,
            context: MarketContext::default(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        if !signal.levels_are_consistent() {
            warn!(
                "{}: dropping {} signal with inconsistent levels (entry {}, tp1 {}, stop {}, safe {})",
                symbol, direction, signal.entry, signal.tp1, signal.stop_loss, signal.safe_stop_loss
            );
            return None;
        }

        debug!(
            "{}: {} signal from {} at {:.4}, {}x, confidence {}",
            symbol, direction, primary_tf, signal.entry, signal.leverage, signal.confidence
        );
        Some(signal)
    }
}

/// Cast the votes of one timeframe.
///
/// Rules whose indicators are undefined at the latest bar are skipped.
pub fn analyze_timeframe(
    timeframe: Timeframe,
    set: &IndicatorSet,
    price: f64,
) -> TimeframeAnalysis {
    let mut tally = VoteTally::default();

    let rsi = set.scalar("rsi");
    if let Some(rsi) = rsi {
        if rsi < RSI_OVERSOLD {
            tally.cast(VoteSource::Rsi, Direction::Long, 2);
        } else if rsi > RSI_OVERBOUGHT {
            tally.cast(VoteSource::Rsi, Direction::Short, 2);
        } else if (RSI_NEUTRAL_LOW..=RSI_NEUTRAL_HIGH).contains(&rsi) {
            tally.add_confidence(1);
        }
    }

    if let (Some(line), Some(signal), Some(prev_line), Some(prev_signal)) = (
        latest(&set.macd_line),
        latest(&set.macd_signal),
        previous(&set.macd_line),
        previous(&set.macd_signal),
    ) {
        if line > signal && prev_line <= prev_signal {
            tally.cast(VoteSource::MacdCrossover, Direction::Long, 2);
        } else if line < signal && prev_line >= prev_signal {
            tally.cast(VoteSource::MacdCrossover, Direction::Short, 2);
        }
    }

    if let (Some(sma_short), Some(sma_long), Some(ema_short), Some(ema_long)) = (
        set.sma.get(&SMA_SHORT).and_then(latest),
        set.sma.get(&SMA_LONG).and_then(latest),
        set.ema.get(&EMA_SHORT).and_then(latest),
        set.ema.get(&EMA_LONG).and_then(latest),
    ) {
        if price > sma_short && sma_short > sma_long && ema_short > ema_long {
            tally.cast(VoteSource::MovingAverages, Direction::Long, 1);
        } else if price < sma_short && sma_short < sma_long && ema_short < ema_long {
            tally.cast(VoteSource::MovingAverages, Direction::Short, 1);
        }
    }

    if let (Some(upper), Some(lower)) = (latest(&set.bb_upper), latest(&set.bb_lower)) {
        if price <= lower {
            tally.cast(VoteSource::BollingerBands, Direction::Long, 1);
        } else if price >= upper {
            tally.cast(VoteSource::BollingerBands, Direction::Short, 1);
        }
    }

    if set.volume_ratio.is_some_and(|ratio| ratio > HIGH_VOLUME_RATIO) {
        tally.add_confidence(1);
    }

    if let Some(trend) = set.linear_trend {
        if trend.slope > 0.0 {
            tally.cast(VoteSource::LinearTrend, Direction::Long, 1);
        } else if trend.slope < 0.0 {
            tally.cast(VoteSource::LinearTrend, Direction::Short, 1);
        }
    }

    TimeframeAnalysis {
        timeframe,
        bias: tally.bias(),
        confidence: tally.confidence,
        votes: tally.votes,
        rsi,
        support: set.support,
        resistance: set.resistance,
    }
}

/// Direction shared by at least `threshold` of the non-neutral timeframes.
pub fn overall_bias(biases: &[Bias], threshold: f64) -> Bias {
    let directional: Vec<Direction> = biases.iter().filter_map(Bias::direction).collect();
    if directional.is_empty() {
        return Bias::Neutral;
    }

    let total = directional.len() as f64;
    let longs = directional.iter().filter(|d| **d == Direction::Long).count() as f64;
    let shorts = total - longs;

    if longs / total >= threshold {
        Bias::Long
    } else if shorts / total >= threshold {
        Bias::Short
    } else {
        Bias::Neutral
    }
}

/// Timeframe whose indicators drive the price levels: the first entry of
/// [`Timeframe::PRIMARY_PREFERENCE`] that is present, then the first
/// requested timeframe that is present, then any available one.
pub fn primary_timeframe(
    indicators: &TimeframeIndicators,
    timeframes: &[Timeframe],
) -> Option<Timeframe> {
    Timeframe::PRIMARY_PREFERENCE
        .iter()
        .chain(timeframes.iter())
        .find(|tf| indicators.contains_key(tf))
        .copied()
        .or_else(|| indicators.keys().next().copied())
}

/// Entry just beyond the current price, pulled toward support (long) or
/// resistance (short).
pub fn entry_price(
    price: f64,
    direction: Direction,
    support: Option<f64>,
    resistance: Option<f64>,
) -> f64 {
    match direction {
        Direction::Long => {
            let support = support.unwrap_or(price * 0.98);
            (price * 1.001).min((price + support) / 2.0)
        }
        Direction::Short => {
            let resistance = resistance.unwrap_or(price * 1.02);
            (price * 0.999).max((price + resistance) / 2.0)
        }
    }
}

/// Target spacing: the larger of the price std-dev and half the volatility
/// share of entry.
pub fn base_distance(entry: f64, volatility_pct: f64, std_dev: f64) -> f64 {
    std_dev.max(entry * (volatility_pct / 100.0) * 0.5)
}

/// TP1..TP4 at Fibonacci multiples of `base` on the profit side of entry.
pub fn take_profits(entry: f64, direction: Direction, base: f64) -> [f64; 4] {
    TAKE_PROFIT_RATIOS.map(|ratio| entry + direction.sign() * base * ratio)
}

/// Structural stop beyond support/resistance and a volatility-scaled safe
/// stop, as `(stop_loss, safe_stop_loss)`.
pub fn stop_losses(
    entry: f64,
    direction: Direction,
    support: Option<f64>,
    resistance: Option<f64>,
    volatility_pct: f64,
) -> (f64, f64) {
    match direction {
        Direction::Long => {
            let support = support.unwrap_or(entry * 0.95);
            (support * 0.995, entry * (1.0 - volatility_pct / 200.0))
        }
        Direction::Short => {
            let resistance = resistance.unwrap_or(entry * 1.05);
            (resistance * 1.005, entry * (1.0 + volatility_pct / 200.0))
        }
    }
}

/// Leverage suggestion: calmer markets allow more.
pub fn leverage(volatility_pct: f64) -> u8 {
    if volatility_pct < 5.0 {
        5
    } else if volatility_pct < 10.0 {
        3
    } else if volatility_pct < 20.0 {
        2
    } else {
        1
    }
}

/// Accumulated confidence as a percentage of the maximum, capped at 100 and
/// rounded to one decimal.
pub fn confidence(analyses: &[TimeframeAnalysis], max_per_timeframe: u32) -> f64 {
    let max_possible = analyses.len() as f64 * max_per_timeframe as f64;
    if max_possible <= 0.0 {
        return 0.0;
    }
    let total: u32 = analyses.iter().map(|a| a.confidence).sum();
    let pct = (total as f64 / max_possible * 100.0).min(100.0);
    (pct * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinearTrend;
    use std::collections::BTreeMap;

    fn set_with_trend(slope: f64) -> IndicatorSet {
        let mut set = IndicatorSet::new(50);
        set.linear_trend = Some(LinearTrend {
            slope,
            r_squared: Some(0.9),
            prediction: 100.0,
        });
        set
    }

    fn analysis(timeframe: Timeframe, bias: Bias, confidence: u32) -> TimeframeAnalysis {
        TimeframeAnalysis {
            timeframe,
            bias,
            confidence,
            votes: Vec::new(),
            rsi: None,
            support: None,
            resistance: None,
        }
    }

    #[test]
    fn test_take_profits_long() {
        let tps = take_profits(100.0, Direction::Long, 10.0);
        let expected = [106.18, 110.0, 116.18, 126.18];
        for (tp, want) in tps.iter().zip(expected) {
            assert!((tp - want).abs() < 1e-9, "{} != {}", tp, want);
        }
    }

    #[test]
    fn test_take_profits_short_descend() {
        let tps = take_profits(100.0, Direction::Short, 10.0);
        assert!(tps.windows(2).all(|w| w[1] < w[0]));
        assert!(tps[0] < 100.0);
    }

    #[test]
    fn test_leverage_bands() {
        assert_eq!(leverage(4.0), 5);
        assert_eq!(leverage(5.0), 3);
        assert_eq!(leverage(9.99), 3);
        assert_eq!(leverage(15.0), 2);
        assert_eq!(leverage(20.0), 1);
        assert_eq!(leverage(80.0), 1);
    }

    #[test]
    fn test_overall_bias_agreement() {
        assert_eq!(
            overall_bias(&[Bias::Long, Bias::Long, Bias::Neutral], 0.6),
            Bias::Long
        );
        assert_eq!(
            overall_bias(&[Bias::Long, Bias::Short, Bias::Neutral], 0.6),
            Bias::Neutral
        );
        assert_eq!(
            overall_bias(&[Bias::Short, Bias::Short, Bias::Long], 0.6),
            Bias::Short
        );
        assert_eq!(overall_bias(&[Bias::Neutral, Bias::Neutral], 0.6), Bias::Neutral);
        assert_eq!(overall_bias(&[], 0.6), Bias::Neutral);
    }

    #[test]
    fn test_primary_timeframe_preference() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        map.insert(Timeframe::OneDay, IndicatorSet::new(1));
        map.insert(Timeframe::OneHour, IndicatorSet::new(1));
        let requested = [Timeframe::OneDay, Timeframe::OneHour];
        assert_eq!(primary_timeframe(&map, &requested), Some(Timeframe::OneHour));

        map.insert(Timeframe::FourHours, IndicatorSet::new(1));
        assert_eq!(primary_timeframe(&map, &requested), Some(Timeframe::FourHours));

        let mut daily_only: TimeframeIndicators = BTreeMap::new();
        daily_only.insert(Timeframe::OneWeek, IndicatorSet::new(1));
        daily_only.insert(Timeframe::OneDay, IndicatorSet::new(1));
        assert_eq!(
            primary_timeframe(&daily_only, &[Timeframe::OneWeek, Timeframe::OneDay]),
            Some(Timeframe::OneWeek)
        );
        assert_eq!(primary_timeframe(&BTreeMap::new(), &requested), None);
    }

    #[test]
    fn test_entry_price_defaults() {
        // long: min(100.1, (100 + 98) / 2) = 99
        assert!((entry_price(100.0, Direction::Long, None, None) - 99.0).abs() < 1e-9);
        // short: max(99.9, (100 + 102) / 2) = 101
        assert!((entry_price(100.0, Direction::Short, None, None) - 101.0).abs() < 1e-9);
        // support right at price: entry capped at price * 1.001
        let entry = entry_price(100.0, Direction::Long, Some(100.5), None);
        assert!((entry - 100.1).abs() < 1e-9);
    }

    #[test]
    fn test_stop_losses() {
        let (stop, safe) = stop_losses(100.0, Direction::Long, Some(90.0), None, 10.0);
        assert!((stop - 89.55).abs() < 1e-9);
        assert!((safe - 95.0).abs() < 1e-9);

        let (stop, safe) = stop_losses(100.0, Direction::Short, None, None, 10.0);
        assert!((stop - 105.525).abs() < 1e-9);
        assert!((safe - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_capped_and_rounded() {
        let analyses = vec![
            analysis(Timeframe::OneHour, Bias::Long, 3),
            analysis(Timeframe::FourHours, Bias::Long, 4),
            analysis(Timeframe::OneDay, Bias::Neutral, 0),
        ];
        assert_eq!(confidence(&analyses, 10), 23.3);

        let strong = vec![analysis(Timeframe::OneHour, Bias::Long, 12)];
        assert_eq!(confidence(&strong, 10), 100.0);
        assert_eq!(confidence(&[], 10), 0.0);
    }

    #[test]
    fn test_rsi_oversold_votes_long() {
        let mut set = IndicatorSet::new(2);
        set.rsi = vec![Some(40.0), Some(25.0)];
        let result = analyze_timeframe(Timeframe::OneHour, &set, 100.0);

        assert_eq!(result.bias, Bias::Long);
        assert_eq!(result.confidence, 2);
        assert_eq!(result.votes[0].source, VoteSource::Rsi);
    }

    #[test]
    fn test_rsi_neutral_zone_adds_confidence_only() {
        let mut set = IndicatorSet::new(1);
        set.rsi = vec![Some(50.0)];
        set.volume_ratio = Some(2.0);
        let result = analyze_timeframe(Timeframe::OneHour, &set, 100.0);

        assert_eq!(result.bias, Bias::Neutral);
        assert!(result.votes.is_empty());
        assert_eq!(result.confidence, 2);
    }

    #[test]
    fn test_macd_bearish_crossover() {
        let mut set = IndicatorSet::new(2);
        set.macd_line = vec![Some(1.0), Some(0.5)];
        set.macd_signal = vec![Some(0.8), Some(0.7)];
        let result = analyze_timeframe(Timeframe::OneHour, &set, 100.0);

        assert_eq!(result.bias, Bias::Short);
        assert_eq!(result.votes[0].source, VoteSource::MacdCrossover);
        assert_eq!(result.confidence, 2);
    }

    fn ma_set(sma20: f64, sma50: f64, ema12: f64, ema26: f64) -> IndicatorSet {
        let mut set = IndicatorSet::new(1);
        set.sma.insert(20, vec![Some(sma20)]);
        set.sma.insert(50, vec![Some(sma50)]);
        set.ema.insert(12, vec![Some(ema12)]);
        set.ema.insert(26, vec![Some(ema26)]);
        set
    }

    #[test]
    fn test_moving_average_alignment() {
        let long = analyze_timeframe(Timeframe::OneHour, &ma_set(97.0, 95.0, 96.0, 94.0), 100.0);
        assert_eq!(long.bias, Bias::Long);
        assert_eq!(long.votes[0].source, VoteSource::MovingAverages);

        let short = analyze_timeframe(Timeframe::OneHour, &ma_set(103.0, 105.0, 104.0, 106.0), 100.0);
        assert_eq!(short.bias, Bias::Short);
        assert_eq!(short.votes[0].direction, Direction::Short);
    }

    #[test]
    fn test_inverted_smas_cast_no_vote() {
        let long_side = analyze_timeframe(Timeframe::OneHour, &ma_set(95.0, 97.0, 96.0, 94.0), 100.0);
        assert!(long_side
            .votes
            .iter()
            .all(|v| v.source != VoteSource::MovingAverages));

        let short_side = analyze_timeframe(Timeframe::OneHour, &ma_set(105.0, 103.0, 104.0, 106.0), 100.0);
        assert!(short_side.votes.is_empty());
        assert_eq!(short_side.bias, Bias::Neutral);
    }

    #[test]
    fn test_undefined_indicators_cast_no_votes() {
        let set = IndicatorSet::new(5);
        let result = analyze_timeframe(Timeframe::OneDay, &set, 100.0);

        assert_eq!(result.bias, Bias::Neutral);
        assert!(result.votes.is_empty());
        assert_eq!(result.confidence, 0);
    }

    #[test]
    fn test_generate_returns_none_when_everything_missing() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        for tf in Timeframe::DEFAULT_SET {
            map.insert(tf, IndicatorSet::new(0));
        }
        let generator = SignalGenerator::default();
        assert!(generator
            .generate("BTC", 100.0, &map, &Timeframe::DEFAULT_SET)
            .is_none());
    }

    #[test]
    fn test_generate_long_with_low_volatility() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        for tf in Timeframe::DEFAULT_SET {
            let mut set = set_with_trend(0.5);
            set.volatility = Some(4.0);
            set.std_dev = Some(1.5);
            set.support = Some(90.0);
            set.resistance = Some(110.0);
            map.insert(tf, set);
        }

        let signal = SignalGenerator::default()
            .generate("ETH", 100.0, &map, &Timeframe::DEFAULT_SET)
            .unwrap();

        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.leverage, 5);
        assert!(signal.levels_are_consistent());
        assert_eq!(signal.timeframes.len(), 3);
        // one trend point per timeframe out of 10
        assert_eq!(signal.confidence, 10.0);
    }

    #[test]
    fn test_generate_skips_missing_timeframes() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        map.insert(Timeframe::OneHour, set_with_trend(-1.0));

        let signal = SignalGenerator::default()
            .generate("SOL", 50.0, &map, &Timeframe::DEFAULT_SET)
            .unwrap();

        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.timeframes.len(), 1);
        assert!(signal.stop_loss > signal.entry);
        assert_eq!(signal.confidence, 10.0);
    }

    #[test]
    fn test_wrong_side_stop_falls_back_to_safe_stop() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        let mut set = set_with_trend(1.0);
        // support above the entry leaves the structural stop unusable
        set.support = Some(120.0);
        set.volatility = Some(8.0);
        map.insert(Timeframe::FourHours, set);

        let signal = SignalGenerator::default()
            .generate("ADA", 100.0, &map, &[Timeframe::FourHours])
            .unwrap();

        assert_eq!(signal.stop_loss, signal.safe_stop_loss);
        assert!(signal.stop_loss < signal.entry);
    }

    #[test]
    fn test_degenerate_levels_are_dropped() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        let mut set = set_with_trend(1.0);
        set.volatility = Some(0.0);
        set.std_dev = Some(0.0);
        map.insert(Timeframe::OneHour, set);

        assert!(SignalGenerator::default()
            .generate("XRP", 1.0, &map, &[Timeframe::OneHour])
            .is_none());
    }

    #[test]
    fn test_non_positive_price_yields_no_signal() {
        let mut map: TimeframeIndicators = BTreeMap::new();
        map.insert(Timeframe::OneHour, set_with_trend(1.0));
        assert!(SignalGenerator::default()
            .generate("BTC", 0.0, &map, &[Timeframe::OneHour])
            .is_none());
    }
}
