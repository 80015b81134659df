//! Rules: the engine trait and the Kuhhandel state machine.
//!
//! `RulesEngine` is the seam the environment layer and rollouts use:
//! - Legal actions and acting seats for each state
//! - How actions modify state
//! - Terminal detection and final ranking

pub mod engine;
pub mod machine;

pub use engine::{GameResult, RulesEngine};
pub use machine::GameStateMachine;
