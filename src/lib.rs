//! # kuhhandel
//!
//! A deterministic rule engine for the auction card game Kuhhandel
//! ("You're Bluffing!"), with an environment interface for RL training.
//!
//! ## Design Principles
//!
//! 1. **Zero-Sum Ledger**: Money only moves through `Ledger`, and the total
//!    held by players always equals the initial deal plus what the bank paid
//!    out minus what it took in. Rewards computed from money are exact.
//!
//! 2. **N-Player First**: Every API takes `player_count` as context. Tables
//!    of 3 to 5 seats are supported.
//!
//! 3. **Configuration Over Convention**: Rule editions differ (change-giving,
//!    duel tie-breaks, turn structure), so every variant is a field of the
//!    immutable `RulesConfig` threaded through the state machine at reset.
//!
//! ## Architecture
//!
//! - **Validate, then commit**: an action is validated without mutation,
//!   executed on a clone, checked against the structural invariants, and only
//!   then committed. Rejected actions leave the state byte-identical.
//!
//! - **Two commitment slots**: duel bids are sealed and may arrive in either
//!   order; nothing is revealed until both are in.
//!
//! - **Persistent Data Structures**: cheap state clones via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: players, RNG, configuration, errors, actions, events, state
//! - `cards`: animal kinds, the deck, herds
//! - `ledger`: notes, holdings, and the bank
//! - `auction`: the ascending open auction
//! - `duel`: the sealed-bid duel
//! - `rules`: the `RulesEngine` trait and `GameStateMachine`
//! - `env`: observations, masks, encoders, agents

pub mod auction;
pub mod cards;
pub mod core;
pub mod duel;
pub mod env;
pub mod ledger;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, ConfigError, GameError, GameEvent, GameRng, GameState, IllegalAction,
    IllegalBidPolicy, Phase, PhaseKind, PlayerId, PlayerMap, RulesConfig, Snapshot, SnapshotError,
    TieBreak, TurnStructure,
};

pub use crate::cards::{AnimalCard, AnimalType, CardId, Deck, Herd};

pub use crate::ledger::{Holder, Ledger, LedgerError, Notes, Payment};

pub use crate::auction::{AuctionEngine, AuctionResult, AuctionStatus};

pub use crate::duel::{resolve, DuelEngine, DuelOutcome, DuelPhase, DuelRole, DuelStack};

pub use crate::rules::{GameResult, GameStateMachine, RulesEngine};

pub use crate::env::{
    play_episode, ActionSpace, Agent, EncodedState, EnvConfig, EnvironmentAdapter,
    LegalActionMask, Observation, ObservationEncoder, RandomAgent, StateEncoder, StepInfo,
    StepResult,
};
