use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle aggregation period analysed independently by the signal generator.
///
/// Variants are declared shortest first, so ordered maps keyed by
/// `Timeframe` iterate from the shortest horizon to the longest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Timeframe {
    /// Timeframes analysed when nothing else is configured.
    pub const DEFAULT_SET: [Timeframe; 3] =
        [Timeframe::OneHour, Timeframe::FourHours, Timeframe::OneDay];

    /// Preference order for the timeframe whose levels drive entry, targets,
    /// stops and leverage: mid-length first, then the short horizon.
    pub const PRIMARY_PREFERENCE: [Timeframe; 2] = [Timeframe::FourHours, Timeframe::OneHour];

    /// Parse from a label such as "4h".
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "15m" => Some(Self::FifteenMinutes),
            "1h" => Some(Self::OneHour),
            "4h" => Some(Self::FourHours),
            "1d" => Some(Self::OneDay),
            "1w" => Some(Self::OneWeek),
            _ => None,
        }
    }

    /// Parse a comma-separated list, skipping unknown labels and duplicates.
    pub fn parse_list(s: &str) -> Vec<Self> {
        let mut out = Vec::new();
        for tf in s.split(',').filter_map(Self::from_str) {
            if !out.contains(&tf) {
                out.push(tf);
            }
        }
        out
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
        }
    }

    /// Candle length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Self::FifteenMinutes => 900,
            Self::OneHour => 3_600,
            Self::FourHours => 14_400,
            Self::OneDay => 86_400,
            Self::OneWeek => 604_800,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base/quote trading pair, e.g. BTC/USDT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    pub base: String,
    pub quote: String,
}

impl AssetPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }

    /// Exchange-style concatenated symbol ("BTCUSDT").
    pub fn joined(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
