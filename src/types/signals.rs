use serde::{Deserialize, Serialize};
use std::fmt;

use super::Timeframe;

/// Side of a trade recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a vote count: a side, or no agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Long,
    Short,
    Neutral,
}

impl Bias {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Bias::Long => Some(Direction::Long),
            Bias::Short => Some(Direction::Short),
            Bias::Neutral => None,
        }
    }
}

impl From<Direction> for Bias {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Long => Bias::Long,
            Direction::Short => Bias::Short,
        }
    }
}

/// Indicator rule that produced a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSource {
    Rsi,
    MacdCrossover,
    MovingAverages,
    BollingerBands,
    LinearTrend,
}

/// A directional vote cast by one indicator rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub source: VoteSource,
    pub direction: Direction,
    /// Confidence points the rule contributed.
    pub weight: u32,
}

/// Vote tally and confidence for a single timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeAnalysis {
    pub timeframe: Timeframe,
    pub bias: Bias,
    /// Confidence points accumulated on this timeframe.
    pub confidence: u32,
    pub votes: Vec<Vote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
}

/// Market metadata attached to a signal by the coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    pub name: Option<String>,
    /// 0-100 composite of recent price and volume activity.
    pub momentum_score: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

/// A complete trade recommendation for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSignal {
    pub symbol: String,
    pub direction: Direction,
    pub entry: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub tp4: f64,
    pub stop_loss: f64,
    /// Volatility-derived stop, used when the structural stop is unusable.
    pub safe_stop_loss: f64,
    pub leverage: u8,
    /// Agreement strength, 0-100 with one decimal.
    pub confidence: f64,
    pub timeframes: Vec<TimeframeAnalysis>,
    #[serde(default)]
    pub context: MarketContext,
    /// Unix timestamp (milliseconds) when generated.
    pub timestamp: i64,
}

impl TradingSignal {
    pub fn take_profits(&self) -> [f64; 4] {
        [self.tp1, self.tp2, self.tp3, self.tp4]
    }

    /// Whether targets and stops are ordered correctly around the entry.
    pub fn levels_are_consistent(&self) -> bool {
        levels_are_consistent(
            self.direction,
            self.entry,
            &self.take_profits(),
            &[self.stop_loss, self.safe_stop_loss],
        )
    }

    /// Percentage move from entry to the first target, positive when the
    /// target is on the profit side.
    pub fn potential_return_pct(&self) -> Option<f64> {
        if !(self.entry > 0.0) {
            return None;
        }
        let pct = (self.tp1 - self.entry) / self.entry * 100.0 * self.direction.sign();
        pct.is_finite().then_some(pct)
    }
}

/// Targets strictly beyond entry and moving away from it, stops strictly on
/// the other side.
pub fn levels_are_consistent(
    direction: Direction,
    entry: f64,
    targets: &[f64],
    stops: &[f64],
) -> bool {
    let s = direction.sign();
    let all_finite = std::iter::once(entry)
        .chain(targets.iter().copied())
        .chain(stops.iter().copied())
        .all(f64::is_finite);
    if !all_finite || entry <= 0.0 {
        return false;
    }

    let mut prev = entry;
    for &target in targets {
        if (target - prev) * s <= 0.0 {
            return false;
        }
        prev = target;
    }
    stops.iter().all(|&stop| (entry - stop) * s > 0.0)
}

/// A ranked signal with its opportunity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSignal {
    pub score: f64,
    pub signal: TradingSignal,
}

/// Result of a market-wide scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityReport {
    /// Best opportunities, highest score first.
    pub signals: Vec<RankedSignal>,
    /// Candidates handed to the analyzer after screening.
    pub total_candidates: usize,
    /// Candidates whose analysis completed (with or without a signal).
    pub total_analyzed: usize,
    /// Candidates skipped because of missing data or a failure.
    pub total_failed: usize,
    /// Signals produced before truncation to top-N.
    pub total_found: usize,
    pub analysis_time_secs: f64,
    /// RFC 3339 time the scan finished.
    pub timestamp: String,
}

/// Signal shaped for a result consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySignal {
    pub symbol: String,
    pub name: String,
    pub direction: Direction,
    pub entry: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub tp4: f64,
    pub stop_loss: f64,
    pub safe_stop_loss: f64,
    pub leverage: u8,
    pub confidence: f64,
    /// Percentage gain to TP1, two decimals.
    pub potential_gain: f64,
    pub momentum_score: f64,
    pub market_cap_rank: u32,
    pub market_cap: f64,
    pub volume_24h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Multi-line human readable rendering.
    pub text: String,
}
