//! Tracker settings shared by the engine and the page.

use crate::format::round_cents;
use crate::progression::Money;

/// A suggested base bet, expressed as a share of the bankroll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BetSuggestion {
    pub label: &'static str,
    pub fraction: f64,
    pub hint: &'static str,
}

impl BetSuggestion {
    pub fn amount(&self, bankroll: Money) -> Money {
        round_cents(bankroll * self.fraction)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// How many rounds the history view shows, newest first.
    pub history_display_limit: usize,
    pub bet_suggestions: Vec<BetSuggestion>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_display_limit: 10,
            bet_suggestions: vec![
                BetSuggestion {
                    label: "Low Risk",
                    fraction: 0.01,
                    hint: "1% of bankroll - Very safe, many rounds possible",
                },
                BetSuggestion {
                    label: "Normal",
                    fraction: 0.025,
                    hint: "2.5% of bankroll - Balanced risk/reward",
                },
                BetSuggestion {
                    label: "Extreme",
                    fraction: 0.05,
                    hint: "5% of bankroll - Higher risk, fewer safe rounds",
                },
            ],
        }
    }
}

impl TrackerConfig {
    /// Suggested base bets for `bankroll`, empty when the bankroll can't fund a bet.
    pub fn suggest_bets(&self, bankroll: Money) -> Vec<(BetSuggestion, Money)> {
        if !bankroll.is_finite() || bankroll <= 0.0 {
            return Vec::new();
        }
        self.bet_suggestions
            .iter()
            .map(|s| (*s, s.amount(bankroll)))
            .filter(|(_, amount)| *amount > 0.0)
            .collect()
    }
}
