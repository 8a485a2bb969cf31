//! Spinwise - roulette progression tracker.
//!
//! The engine tracks a betting session round by round, recommends the next
//! stake and color, estimates how many losses the bankroll can absorb, and
//! keeps an undoable history. It has no browser dependencies; the Yew page in
//! the binary target drives it.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod progression;
pub mod random;

pub use config::{BetSuggestion, TrackerConfig};
pub use engine::{Funding, HistoryEntry, ProgressionEngine, RoundState, Session, SessionStats};
pub use error::EngineError;
pub use progression::{Color, Money, Outcome, ProgressionMode, RiskLevel, WinBand};
pub use random::{RandomSource, ThreadRandom};
