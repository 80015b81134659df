//! Animal cards: kinds, the draw pile, and per-player herds.
//!
//! ## Key Types
//!
//! - `AnimalType`: the ten animal kinds and their standard quartet values
//! - `AnimalCard`: an immutable card instance
//! - `Deck`: the shared draw pile and the quartet tracker
//! - `Herd`: a player's public collection of animals

pub mod animal;
pub mod deck;
pub mod herd;

pub use animal::{AnimalCard, AnimalType, CardId};
pub use deck::{Deck, QuartetRecord, QuartetTracker, CARDS_PER_ANIMAL};
pub use herd::{Herd, HerdCounts};
