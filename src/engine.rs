//! The progression engine: session state, round bookkeeping and undo.
//!
//! Every operation builds a fresh [`RoundState`] and swaps it in whole. Each
//! recorded round pushes a [`HistoryEntry`] holding the values it replaced, so
//! the history doubles as the undo stack.

use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::{EngineError, Result};
use crate::progression::{
    compute_max_survivable_losses, next_bet, pick_color, Color, Money, Outcome, ProgressionMode,
    RiskLevel,
};
use crate::random::{RandomSource, ThreadRandom};

/// Parameters fixed for the life of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Session {
    pub bankroll: Money,
    pub base_bet: Money,
    pub include_green: bool,
    pub mode: ProgressionMode,
}

impl Session {
    pub fn new(
        bankroll: Money,
        base_bet: Money,
        include_green: bool,
        mode: ProgressionMode,
    ) -> Result<Self> {
        let session = Self { bankroll, base_bet, include_green, mode };
        session.validate()?;
        Ok(session)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bankroll.is_finite() || self.bankroll <= 0.0 {
            return Err(EngineError::InvalidInput(
                "Bankroll must be a positive amount".into(),
            ));
        }
        if !self.base_bet.is_finite() || self.base_bet <= 0.0 {
            return Err(EngineError::InvalidInput(
                "Initial bet must be a positive amount".into(),
            ));
        }
        if self.base_bet > self.bankroll {
            return Err(EngineError::InvalidInput(
                "Initial bet cannot be larger than your bankroll".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundState {
    pub round: u32,
    pub current_bet: Money,
    /// Can dip below zero after an oversized custom bet; risk treats that as broke.
    pub current_money: Money,
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    pub total_profit: Money,
    pub strategy_color: Color,
    pub risk_level: RiskLevel,
}

impl RoundState {
    /// State before any session has started.
    pub fn idle() -> Self {
        Self {
            round: 1,
            current_bet: 0.0,
            current_money: 0.0,
            consecutive_wins: 0,
            consecutive_losses: 0,
            total_profit: 0.0,
            strategy_color: Color::Red,
            risk_level: RiskLevel::Low,
        }
    }

    fn opening(session: &Session, color: Color) -> Self {
        Self {
            current_bet: session.base_bet,
            current_money: session.bankroll,
            strategy_color: color,
            ..Self::idle()
        }
        .with_risk()
    }

    fn with_risk(self) -> Self {
        Self {
            risk_level: RiskLevel::from_survivable_losses(self.max_survivable_losses()),
            ..self
        }
    }

    pub fn max_survivable_losses(&self) -> u32 {
        compute_max_survivable_losses(self.current_money.max(0.0), self.current_bet)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::idle()
    }
}

/// One recorded round, with the values it overwrote.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub round: u32,
    pub bet: Money,
    pub result: Outcome,
    pub strategy_color: Color,
    pub profit_delta: Money,
    pub balance_after: Money,
    pub previous_bet: Money,
    pub previous_money: Money,
    pub previous_profit: Money,
    pub previous_losses: u32,
    pub previous_wins: u32,
    /// Win streak after this round.
    pub win_streak: u32,
    pub next_bet: Money,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Funding {
    Sufficient,
    Short {
        balance: Money,
        required: Money,
        shortfall: Money,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStats {
    pub wins: usize,
    pub losses: usize,
    /// `None` until a round has been played.
    pub win_rate: Option<f64>,
    /// Total profit relative to the starting bankroll.
    pub profit_pct: f64,
}

#[derive(Clone, Debug)]
pub struct ProgressionEngine<R = ThreadRandom> {
    config: TrackerConfig,
    rng: R,
    session: Option<Session>,
    state: RoundState,
    history: Vec<HistoryEntry>,
}

impl ProgressionEngine<ThreadRandom> {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_rng(config, ThreadRandom::new())
    }
}

impl<R: RandomSource> ProgressionEngine<R> {
    pub fn with_rng(config: TrackerConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            session: None,
            state: RoundState::idle(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    /// Full history, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The most recent rounds, newest first, capped at the configured display limit.
    pub fn recent_history(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.history
            .iter()
            .rev()
            .take(self.config.history_display_limit)
    }

    /// Whether older rounds exist beyond [`Self::recent_history`].
    pub fn history_truncated(&self) -> bool {
        self.history.len() > self.config.history_display_limit
    }

    pub fn max_survivable_losses(&self) -> u32 {
        if self.is_started() {
            self.state.max_survivable_losses()
        } else {
            0
        }
    }

    /// Begin a new session, discarding any previous one.
    ///
    /// Nothing is touched if `session` fails validation.
    pub fn start(&mut self, session: Session) -> Result<&RoundState> {
        session.validate()?;
        let color = pick_color(session.include_green, &mut self.rng);
        self.state = RoundState::opening(&session, color);
        self.session = Some(session);
        self.history.clear();
        info!(
            bankroll = session.bankroll,
            base_bet = session.base_bet,
            include_green = session.include_green,
            mode = ?session.mode,
            "session started"
        );
        Ok(&self.state)
    }

    /// Record the outcome of the current round.
    ///
    /// `custom_bet` overrides the recommended stake for this round only.
    pub fn record_result(
        &mut self,
        outcome: Outcome,
        custom_bet: Option<Money>,
    ) -> Result<(&RoundState, &HistoryEntry)> {
        let session = self.session.ok_or(EngineError::NotStarted)?;
        let prev = self.state;
        let bet = match custom_bet {
            None => prev.current_bet,
            Some(amount) if amount.is_finite() && amount > 0.0 => amount,
            Some(amount) => {
                return Err(EngineError::InvalidInput(format!(
                    "Bet amount must be positive, got {amount}"
                )))
            }
        };

        let (profit_delta, wins, losses) = match outcome {
            Outcome::Win => (bet, prev.consecutive_wins.saturating_add(1), 0),
            Outcome::Loss => (-bet, 0, prev.consecutive_losses.saturating_add(1)),
        };
        let upcoming = next_bet(
            outcome,
            prev.consecutive_wins,
            prev.consecutive_losses,
            prev.current_bet,
            session.base_bet,
            session.mode,
            &mut self.rng,
        );

        let entry = HistoryEntry {
            round: prev.round,
            bet,
            result: outcome,
            strategy_color: prev.strategy_color,
            profit_delta,
            balance_after: prev.current_money + profit_delta,
            previous_bet: prev.current_bet,
            previous_money: prev.current_money,
            previous_profit: prev.total_profit,
            previous_losses: prev.consecutive_losses,
            previous_wins: prev.consecutive_wins,
            win_streak: wins,
            next_bet: upcoming,
        };

        self.state = RoundState {
            round: prev.round.saturating_add(1),
            current_bet: upcoming,
            current_money: prev.current_money + profit_delta,
            consecutive_wins: wins,
            consecutive_losses: losses,
            total_profit: prev.total_profit + profit_delta,
            strategy_color: pick_color(session.include_green, &mut self.rng),
            risk_level: prev.risk_level,
        }
        .with_risk();

        debug!(
            round = entry.round,
            bet,
            result = outcome.label(),
            balance = self.state.current_money,
            next_bet = upcoming,
            risk = self.state.risk_level.label(),
            "round recorded"
        );
        self.history.push(entry);
        let last = self.history.len() - 1;
        Ok((&self.state, &self.history[last]))
    }

    /// Roll back the last recorded round. Does nothing when there is no history.
    pub fn undo(&mut self) -> &RoundState {
        let Some(last) = self.history.pop() else {
            return &self.state;
        };
        // the color restored is the one recommended for the undone round
        self.state = RoundState {
            round: last.round,
            current_bet: last.previous_bet,
            current_money: last.previous_money,
            consecutive_wins: last.previous_wins,
            consecutive_losses: last.previous_losses,
            total_profit: last.previous_profit,
            strategy_color: last.strategy_color,
            risk_level: self.state.risk_level,
        }
        .with_risk();
        debug!(round = last.round, "round undone");
        &self.state
    }

    /// Drop the session and all history.
    pub fn reset(&mut self) -> &RoundState {
        self.session = None;
        self.history.clear();
        self.state = RoundState::idle();
        info!("session reset");
        &self.state
    }

    pub fn funding(&self) -> Funding {
        let s = &self.state;
        if s.current_money >= s.current_bet {
            Funding::Sufficient
        } else {
            Funding::Short {
                balance: s.current_money,
                required: s.current_bet,
                shortfall: s.current_bet - s.current_money,
            }
        }
    }

    /// Stake the whole remaining balance, recorded as a loss.
    ///
    /// If the spin was actually won, the caller undoes this and records a win
    /// with the same custom amount.
    pub fn play_with_remaining_balance(&mut self) -> Result<(&RoundState, &HistoryEntry)> {
        if !self.is_started() {
            return Err(EngineError::NotStarted);
        }
        let remaining = self.state.current_money;
        if remaining <= 0.0 {
            return Err(EngineError::EmptyBalance);
        }
        warn!(remaining, required = self.state.current_bet, "betting remaining balance");
        self.record_result(Outcome::Loss, Some(remaining))
    }

    /// Top the balance up to exactly the pending bet. Returns the amount added.
    ///
    /// Injected funds are capital, not winnings, so total profit is untouched.
    pub fn add_funds_and_continue(&mut self) -> Result<Money> {
        if !self.is_started() {
            return Err(EngineError::NotStarted);
        }
        let Funding::Short { shortfall, required, .. } = self.funding() else {
            return Ok(0.0);
        };
        self.state = RoundState {
            current_money: required,
            ..self.state
        }
        .with_risk();
        warn!(added = shortfall, balance = required, "funds added to cover bet");
        Ok(shortfall)
    }

    pub fn stats(&self) -> SessionStats {
        let wins = self.history.iter().filter(|e| e.result.is_win()).count();
        let losses = self.history.len() - wins;
        let win_rate = if self.history.is_empty() {
            None
        } else {
            Some(wins as f64 / self.history.len() as f64)
        };
        let profit_pct = self
            .session
            .map(|s| self.state.total_profit / s.bankroll)
            .unwrap_or(0.0);
        SessionStats { wins, losses, win_rate, profit_pct }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(r: f64) -> impl FnMut() -> f64 + Clone {
        move || r
    }

    fn engine(bankroll: Money, base: Money, mode: ProgressionMode) -> ProgressionEngine<impl RandomSource> {
        let mut engine = ProgressionEngine::with_rng(TrackerConfig::default(), constant(0.5));
        engine
            .start(Session::new(bankroll, base, false, mode).unwrap())
            .unwrap();
        engine
    }

    #[test]
    fn start_sets_opening_state() {
        let e = engine(100.0, 10.0, ProgressionMode::Martingale);
        let s = e.state();
        assert_eq!(s.round, 1);
        assert_eq!(s.current_money, 100.0);
        assert_eq!(s.current_bet, 10.0);
        assert_eq!(s.total_profit, 0.0);
        assert_eq!((s.consecutive_wins, s.consecutive_losses), (0, 0));
        // 0.5 without green is black
        assert_eq!(s.strategy_color, Color::Black);
        // 10+20+40 = 70 <= 100 < 150
        assert_eq!(e.max_survivable_losses(), 3);
        assert_eq!(s.risk_level, RiskLevel::Medium);
        assert!(e.history().is_empty());
    }

    #[test]
    fn start_rejects_bad_input_without_mutating() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);
        e.record_result(Outcome::Loss, None).unwrap();
        let before = *e.state();

        let bad = [
            Session { bankroll: 0.0, base_bet: 1.0, include_green: false, mode: ProgressionMode::Martingale },
            Session { bankroll: 50.0, base_bet: 0.0, include_green: false, mode: ProgressionMode::Martingale },
            Session { bankroll: 50.0, base_bet: 60.0, include_green: false, mode: ProgressionMode::Martingale },
            Session { bankroll: f64::NAN, base_bet: 1.0, include_green: true, mode: ProgressionMode::SmartProgressive },
        ];
        for session in bad {
            assert!(matches!(e.start(session), Err(EngineError::InvalidInput(_))));
        }
        assert_eq!(*e.state(), before);
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn operations_before_start_fail() {
        let mut e = ProgressionEngine::with_rng(TrackerConfig::default(), constant(0.1));
        assert_eq!(e.record_result(Outcome::Win, None).unwrap_err(), EngineError::NotStarted);
        assert_eq!(e.play_with_remaining_balance().unwrap_err(), EngineError::NotStarted);
        assert_eq!(e.add_funds_and_continue().unwrap_err(), EngineError::NotStarted);
        assert_eq!(*e.undo(), RoundState::idle());
        assert_eq!(e.max_survivable_losses(), 0);
    }

    #[test]
    fn martingale_loss_then_win() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);

        let (s, entry) = e.record_result(Outcome::Loss, None).unwrap();
        assert_eq!(s.current_money, 90.0);
        assert_eq!(s.current_bet, 20.0);
        assert_eq!(s.total_profit, -10.0);
        assert_eq!(s.consecutive_losses, 1);
        assert_eq!(s.round, 2);
        assert_eq!(entry.profit_delta, -10.0);
        assert_eq!(entry.balance_after, 90.0);
        assert_eq!(entry.next_bet, 20.0);

        let (s, entry) = e.record_result(Outcome::Win, None).unwrap();
        assert_eq!(s.current_money, 110.0);
        assert_eq!(s.current_bet, 10.0);
        assert_eq!(s.total_profit, 10.0);
        assert_eq!(s.consecutive_losses, 0);
        assert_eq!(s.consecutive_wins, 1);
        assert_eq!(entry.bet, 20.0);
        assert_eq!(entry.win_streak, 1);
    }

    #[test]
    fn custom_bet_overrides_stake_once() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);
        let (s, entry) = e.record_result(Outcome::Win, Some(25.0)).unwrap();
        assert_eq!(entry.bet, 25.0);
        assert_eq!(s.current_money, 125.0);
        assert_eq!(s.current_bet, 10.0);

        let err = e.record_result(Outcome::Win, Some(-1.0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn streak_counters_are_exclusive() {
        let mut e = engine(1000.0, 5.0, ProgressionMode::SmartProgressive);
        let pattern = [true, true, false, true, false, false, true, true, true];
        for won in pattern {
            let (s, _) = e.record_result(Outcome::from_won(won), None).unwrap();
            if won {
                assert_eq!(s.consecutive_losses, 0);
                assert!(s.consecutive_wins > 0);
            } else {
                assert_eq!(s.consecutive_wins, 0);
                assert!(s.consecutive_losses > 0);
            }
        }
        assert_eq!(e.state().consecutive_wins, 3);
    }

    #[test]
    fn undo_restores_previous_round() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);
        let opening = *e.state();
        e.record_result(Outcome::Loss, None).unwrap();
        let after_one = *e.state();
        e.record_result(Outcome::Loss, None).unwrap();

        assert_eq!(*e.undo(), after_one);
        assert_eq!(*e.undo(), opening);
        assert_eq!(*e.undo(), opening);
        assert!(e.history().is_empty());
    }

    #[test]
    fn insufficient_funds_and_top_up() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);
        for _ in 0..3 {
            e.record_result(Outcome::Loss, None).unwrap();
        }
        // 100 - 10 - 20 - 40 = 30 against a pending 80
        assert_eq!(
            e.funding(),
            Funding::Short { balance: 30.0, required: 80.0, shortfall: 50.0 }
        );
        assert_eq!(e.state().risk_level, RiskLevel::High);

        let profit = e.state().total_profit;
        assert_eq!(e.add_funds_and_continue().unwrap(), 50.0);
        assert_eq!(e.state().current_money, 80.0);
        assert_eq!(e.state().total_profit, profit);
        assert_eq!(e.funding(), Funding::Sufficient);
        assert_eq!(e.add_funds_and_continue().unwrap(), 0.0);
    }

    #[test]
    fn all_in_is_a_loss_that_can_be_undone() {
        let mut e = engine(100.0, 10.0, ProgressionMode::Martingale);
        for _ in 0..3 {
            e.record_result(Outcome::Loss, None).unwrap();
        }
        let before = *e.state();
        let (s, entry) = e.play_with_remaining_balance().unwrap();
        assert_eq!(entry.bet, 30.0);
        assert_eq!(entry.result, Outcome::Loss);
        assert_eq!(s.current_money, 0.0);
        assert_eq!(e.play_with_remaining_balance().unwrap_err(), EngineError::EmptyBalance);

        assert_eq!(*e.undo(), before);
        let (s, _) = e.record_result(Outcome::Win, Some(30.0)).unwrap();
        assert_eq!(s.current_money, 60.0);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut e = engine(100.0, 10.0, ProgressionMode::SmartProgressive);
        e.record_result(Outcome::Win, None).unwrap();
        assert_eq!(*e.reset(), RoundState::idle());
        assert!(!e.is_started());
        assert!(e.history().is_empty());
        assert_eq!(e.stats().win_rate, None);
    }

    #[test]
    fn recent_history_is_newest_first_and_capped() {
        let mut e = engine(1_000_000.0, 1.0, ProgressionMode::Martingale);
        for i in 0..15 {
            e.record_result(Outcome::from_won(i % 2 == 0), None).unwrap();
        }
        let rounds: Vec<u32> = e.recent_history().map(|h| h.round).collect();
        assert_eq!(rounds, (6..=15).rev().collect::<Vec<_>>());
        assert!(e.history_truncated());
        assert_eq!(e.history().len(), 15);
    }

    #[test]
    fn stats_track_ratio_and_profit() {
        let mut e = engine(200.0, 10.0, ProgressionMode::Martingale);
        e.record_result(Outcome::Win, None).unwrap();
        e.record_result(Outcome::Loss, None).unwrap();
        e.record_result(Outcome::Win, None).unwrap();
        e.record_result(Outcome::Win, None).unwrap();
        let stats = e.stats();
        assert_eq!((stats.wins, stats.losses), (3, 1));
        assert_eq!(stats.win_rate, Some(0.75));
        // +10 -10 +20 +10
        assert_eq!(stats.profit_pct, 30.0 / 200.0);
    }
}
