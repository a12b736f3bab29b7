//! Opportunity scoring and ranking across assets.

use crate::types::{RankedSignal, TradingSignal};
use tracing::{debug, warn};

/// Weights and fallbacks for the opportunity score.
#[derive(Debug, Clone)]
pub struct RankerWeights {
    pub potential_return: f64,
    pub momentum: f64,
    pub market_cap_rank: f64,
    pub volume: f64,
    /// Momentum assumed when the signal carries none.
    pub default_momentum: f64,
    /// Rank assumed when the signal carries none.
    pub default_rank: u32,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            potential_return: 0.4,
            momentum: 0.3,
            market_cap_rank: 0.2,
            volume: 0.1,
            default_momentum: 50.0,
            default_rank: 999,
        }
    }
}

/// Scores signals and keeps the best.
#[derive(Debug, Clone, Default)]
pub struct OpportunityRanker {
    weights: RankerWeights,
}

impl OpportunityRanker {
    pub fn new(weights: RankerWeights) -> Self {
        Self { weights }
    }

    /// Composite opportunity score, or `None` when the signal cannot be
    /// scored (non-positive entry, non-finite result).
    pub fn score(&self, signal: &TradingSignal) -> Option<f64> {
        let w = &self.weights;
        let potential_return = signal.potential_return_pct()?;
        let momentum = signal
            .context
            .momentum_score
            .unwrap_or(w.default_momentum);
        let rank = signal.context.market_cap_rank.unwrap_or(w.default_rank) as f64;
        let volume = signal.context.volume_24h.unwrap_or(0.0);

        let score = w.potential_return * potential_return
            + w.momentum * (momentum - 50.0)
            + w.market_cap_rank * ((100.0 - rank) / 10.0).max(0.0)
            + w.volume * (volume / 1e7).min(10.0);

        score.is_finite().then_some(score)
    }

    /// Score every signal, sort descending (stable for equal scores) and keep
    /// the best `top_n`.
    pub fn rank(&self, signals: Vec<TradingSignal>, top_n: usize) -> Vec<RankedSignal> {
        let mut ranked: Vec<RankedSignal> = signals
            .into_iter()
            .map(|signal| {
                let score = self.score(&signal).unwrap_or_else(|| {
                    warn!("Could not score {} signal, using 0", signal.symbol);
                    0.0
                });
                RankedSignal { score, signal }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_n);

        debug!("Ranked signals, keeping top {}", ranked.len());
        ranked
    }
}
