//! Reinforcement-learning interface.
//!
//! ## Key Types
//!
//! - `EnvironmentAdapter`: reset/step over one match, rewards as money deltas
//! - `Observation`: a seat's view; opponents' money shows only as note counts
//! - `LegalActionMask` / `ActionSpace`: fixed-layout masks and flat indices
//! - `StateEncoder`: observation to tensor
//! - `Agent` / `play_episode`: rollouts

pub mod adapter;
pub mod agent;
pub mod encoder;
pub mod observation;

pub use adapter::{EnvConfig, EnvironmentAdapter, StepInfo, StepResult};
pub use agent::{play_episode, random_agents, Agent, EpisodeSummary, RandomAgent};
pub use encoder::{EncodedState, ObservationEncoder, StateEncoder};
pub use observation::{
    challenge_index, ActionSpace, AuctionView, DuelView, LegalActionMask, Observation, StackView,
};
