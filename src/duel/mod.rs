//! Sealed-bid duels ("cow trades") between two players over an animal kind.

pub mod engine;

pub use engine::{resolve, DuelEngine, DuelOutcome, DuelPhase, DuelRole, DuelStack};
