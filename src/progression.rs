//! Betting rules: color picks, Martingale risk, and next-stake progression.
//!
//! All functions here are pure apart from the draws they take from a
//! [`RandomSource`].

use crate::random::{draw, RandomSource};

pub type Money = f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Black => "BLACK",
            Self::Green => "GREEN",
        }
    }

    /// CSS class used by the presentation layer.
    pub fn class(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
            Self::Green => "green",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn from_won(won: bool) -> Self {
        if won { Self::Win } else { Self::Loss }
    }

    pub fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_survivable_losses(losses: u32) -> Self {
        match losses {
            0..=2 => Self::High,
            3..=5 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressionMode {
    Martingale,
    SmartProgressive,
}

impl ProgressionMode {
    pub fn all() -> &'static [(Self, &'static str)] {
        &[
            (Self::SmartProgressive, "Smart Progressive"),
            (Self::Martingale, "Classic Martingale"),
        ]
    }

    pub fn from_progressive(progressive: bool) -> Self {
        if progressive { Self::SmartProgressive } else { Self::Martingale }
    }

    pub fn is_progressive(self) -> bool {
        matches!(self, Self::SmartProgressive)
    }
}

/// Pick the color to recommend for the next spin.
///
/// With green in play the split is 45% red, 45% black, 10% green; otherwise a
/// fair coin between red and black.
pub fn pick_color(include_green: bool, rng: &mut impl RandomSource) -> Color {
    let r = draw(rng);
    if include_green {
        if r < 0.45 {
            Color::Red
        } else if r < 0.90 {
            Color::Black
        } else {
            Color::Green
        }
    } else if r < 0.5 {
        Color::Red
    } else {
        Color::Black
    }
}

/// Number of consecutive Martingale losses `money` can fund starting at `bet`.
///
/// Walks the doubling sequence and deducts each stake in turn, so the answer is
/// the largest `n` with `money >= bet * (2^n - 1)`.
pub fn compute_max_survivable_losses(money: Money, bet: Money) -> u32 {
    if !money.is_finite() || !bet.is_finite() || bet <= 0.0 {
        return 0;
    }
    let mut remaining = money;
    let mut stake = bet;
    let mut losses = 0;
    while remaining >= stake {
        remaining -= stake;
        stake *= 2.0;
        losses += 1;
    }
    losses
}

/// Multiplier band for a winning streak of a given length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WinBand {
    First,
    Second,
    Third,
    Peak,
    Long,
}

impl WinBand {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            0 | 1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            4..=6 => Self::Peak,
            _ => Self::Long,
        }
    }

    /// `(threshold, multiplier)` pairs, checked in order; a draw strictly above
    /// the threshold takes the multiplier. Anything left over bets 1x.
    fn table(self) -> &'static [(f64, u32)] {
        match self {
            Self::First => &[(0.4, 2)],
            Self::Second => &[(0.7, 3), (0.3, 2)],
            Self::Third => &[(0.8, 4), (0.6, 3), (0.3, 2)],
            Self::Peak => &[(0.85, 5), (0.7, 4), (0.5, 3), (0.25, 2)],
            // long streaks mostly fall back to base to bank the profit
            Self::Long => &[(0.9, 6), (0.7, 3), (0.4, 2)],
        }
    }

    pub fn multiplier(self, r: f64) -> u32 {
        self.table()
            .iter()
            .find(|(threshold, _)| r > *threshold)
            .map(|(_, m)| *m)
            .unwrap_or(1)
    }

    pub fn max_multiplier(self) -> u32 {
        self.table().iter().map(|(_, m)| *m).max().unwrap_or(1)
    }

    /// Probability of falling back to the base bet.
    pub fn base_probability(self) -> f64 {
        self.table().last().map(|(t, _)| *t).unwrap_or(1.0)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::First => "Modest increase options (1x-2x)",
            Self::Second => "Balanced choices (1x-3x)",
            Self::Third => "More options (1x-4x)",
            Self::Peak => "Peak opportunities (1x-5x)",
            Self::Long => "Conservative with rare big bets (1x-6x)",
        }
    }
}

/// Stake for the round after `outcome`.
///
/// `win_streak` and `loss_streak` are the streaks going into the round that
/// produced `outcome`.
pub fn next_bet(
    outcome: Outcome,
    win_streak: u32,
    loss_streak: u32,
    current_bet: Money,
    base_bet: Money,
    mode: ProgressionMode,
    rng: &mut impl RandomSource,
) -> Money {
    match (mode, outcome) {
        (ProgressionMode::Martingale, Outcome::Win) => base_bet,
        (ProgressionMode::Martingale, Outcome::Loss) => current_bet * 2.0,
        (ProgressionMode::SmartProgressive, Outcome::Win) => {
            let band = WinBand::for_streak(win_streak.saturating_add(1));
            let multiplier = band.multiplier(draw(rng));
            tracing::trace!(?band, multiplier, loss_streak, "win multiplier drawn");
            base_bet * f64::from(multiplier)
        }
        // a loss right after a run of wins locks the profit back in
        (ProgressionMode::SmartProgressive, Outcome::Loss) if win_streak > 0 => base_bet,
        (ProgressionMode::SmartProgressive, Outcome::Loss) => current_bet * 2.0,
    }
}
