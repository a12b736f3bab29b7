//! Display formatting for signals.

use crate::types::{Direction, DisplaySignal, RankedSignal, TradingSignal};

/// Format a price with precision scaled to its magnitude, dropping trailing
/// zeros but keeping at least two decimals.
pub fn format_price(price: f64) -> String {
    const MIN_DECIMALS: usize = 2;

    let magnitude = price.abs();
    let decimals = if magnitude >= 1000.0 {
        2
    } else if magnitude >= 100.0 {
        3
    } else if magnitude >= 10.0 {
        4
    } else if magnitude >= 1.0 {
        5
    } else if magnitude >= 0.1 {
        6
    } else if magnitude >= 0.01 {
        7
    } else {
        8
    };

    let formatted = format!("{:.*}", decimals, price);
    let trimmed = formatted.trim_end_matches('0');
    let kept = trimmed.split('.').nth(1).map_or(0, str::len);
    if kept < MIN_DECIMALS {
        format!("{:.*}", MIN_DECIMALS, price)
    } else {
        trimmed.to_string()
    }
}

/// Multi-line text rendering of a signal.
pub fn signal_text(signal: &TradingSignal, quote: &str) -> String {
    let arrow = match signal.direction {
        Direction::Long => "▲",
        Direction::Short => "▼",
    };

    let mut lines = vec![
        format!("{}/{} {} {}", signal.symbol, quote, arrow, signal.direction),
        format!("Entry: {}", format_price(signal.entry)),
        "Take-Profit Targets:".to_string(),
    ];
    for (i, tp) in signal.take_profits().iter().enumerate() {
        lines.push(format!("  TP{}: {}", i + 1, format_price(*tp)));
    }
    lines.push(format!("Stop-loss: {}", format_price(signal.stop_loss)));
    lines.push(format!("Safe Stop-loss: {}", format_price(signal.safe_stop_loss)));
    lines.push(format!("Leverage: {}x", signal.leverage));
    lines.join("\n")
}

impl DisplaySignal {
    /// Shape a signal for display; missing market context falls back to
    /// neutral momentum and rank 999.
    pub fn from_signal(signal: &TradingSignal, score: Option<f64>, quote: &str) -> Self {
        let potential_gain = signal
            .potential_return_pct()
            .map(|pct| (pct * 100.0).round() / 100.0)
            .unwrap_or(0.0);
        let context = &signal.context;

        DisplaySignal {
            symbol: signal.symbol.clone(),
            name: context.name.clone().unwrap_or_else(|| signal.symbol.clone()),
            direction: signal.direction,
            entry: signal.entry,
            tp1: signal.tp1,
            tp2: signal.tp2,
            tp3: signal.tp3,
            tp4: signal.tp4,
            stop_loss: signal.stop_loss,
            safe_stop_loss: signal.safe_stop_loss,
            leverage: signal.leverage,
            confidence: signal.confidence,
            potential_gain,
            momentum_score: context.momentum_score.unwrap_or(50.0),
            market_cap_rank: context.market_cap_rank.unwrap_or(999),
            market_cap: context.market_cap.unwrap_or(0.0),
            volume_24h: context.volume_24h.unwrap_or(0.0),
            score,
            text: signal_text(signal, quote),
        }
    }

    pub fn from_ranked(ranked: &RankedSignal, quote: &str) -> Self {
        Self::from_signal(&ranked.signal, Some(ranked.score), quote)
    }
}
