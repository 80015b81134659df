//! Error taxonomy.
//!
//! - [`IllegalAction`]: the caller asked for something the rules forbid. The
//!   state is untouched and the caller may try again.
//! - [`ConfigError`]: a rule configuration that cannot start a match.
//! - [`GameError::InvariantViolation`]: the engine itself is wrong. The match is
//!   aborted because rewards computed from it can no longer be trusted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::PlayerId;
use super::state::PhaseKind;
use crate::cards::AnimalType;
use crate::ledger::LedgerError;

/// A rejected action. Never changes state.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalAction {
    #[error("the match is over")]
    GameOver,

    #[error("action not allowed during {0:?}")]
    WrongPhase(PhaseKind),

    #[error("not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("{0} is not seated at this table")]
    UnknownPlayer(PlayerId),

    #[error("bid {amount} must exceed the current bid {high_bid}")]
    BidTooLow { amount: u32, high_bid: u32 },

    #[error("bid {amount} is not a multiple of {increment}")]
    BidNotMultiple { amount: u32, increment: u32 },

    #[error("insufficient funds: {0}")]
    InsufficientFunds(#[from] LedgerError),

    #[error("top note {0} is not part of the stack")]
    TopNoteNotInStack(u32),

    #[error("{0} already committed a duel bid")]
    AlreadyCommitted(PlayerId),

    #[error("{0} is not part of this duel")]
    NotInDuel(PlayerId),

    #[error("duels are disabled in this rule set")]
    DuelsDisabled,

    #[error("cannot challenge {defender} over {animal}")]
    IneligibleChallenge { defender: PlayerId, animal: AnimalType },
}

/// A rule configuration that cannot start a match.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count {count} outside {min}..={max}")]
    PlayerCount { count: usize, min: usize, max: usize },

    #[error("bid increment must be positive")]
    ZeroIncrement,

    #[error("no quartet value configured for {0}")]
    MissingQuartetValue(AnimalType),

    #[error("deck has no animals")]
    EmptyDeck,

    #[error("{0} appears more than once in the deck composition")]
    DuplicateAnimal(AnimalType),

    #[error("starting notes use denomination {0}, which is not configured")]
    UnknownDenomination(u32),

    #[error("denominations have no note worth more than 0")]
    NoPositiveDenomination,

    #[error("{what} of {amount} cannot be paid exactly in the configured denominations")]
    Unrepresentable { what: String, amount: u64 },

    #[error("invalid configuration JSON: {0}")]
    Parse(String),
}

/// Everything the engine can report.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Illegal(#[from] IllegalAction),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl GameError {
    /// The rejection, if this error is a recoverable illegal action.
    #[must_use]
    pub fn as_illegal(&self) -> Option<&IllegalAction> {
        match self {
            GameError::Illegal(illegal) => Some(illegal),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InvariantViolation(_))
    }
}
