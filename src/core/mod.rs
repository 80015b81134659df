//! Core engine types: players, RNG, configuration, actions, events, state.
//!
//! Everything the sub-engines and the state machine share lives here. Rule
//! variants are expressed through `RulesConfig` rather than code paths spread
//! across modules.

pub mod action;
pub mod config;
pub mod error;
pub mod event;
pub mod player;
pub mod rng;
pub mod snapshot;
pub mod state;

pub use action::{Action, ActionRecord};
pub use config::{IllegalBidPolicy, RulesConfig, TieBreak, TurnStructure, MAX_PLAYERS, MIN_PLAYERS};
pub use error::{ConfigError, GameError, IllegalAction};
pub use event::GameEvent;
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use snapshot::{Snapshot, SnapshotError};
pub use state::{GameState, Phase, PhaseKind};
