//! The face-down animal draw pile and the quartet-completion tracker.
//!
//! The deck uses an `im::Vector` so cloning a whole `GameState` (rollouts,
//! clone-and-commit in the state machine) stays cheap.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::animal::{AnimalCard, AnimalType, CardId};
use crate::core::{GameRng, PlayerId};

/// Copies of each animal in the deck; also the quartet size.
pub const CARDS_PER_ANIMAL: u8 = 4;

/// A completed quartet: who scored it, what it paid, which cards left play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuartetRecord {
    pub owner: PlayerId,
    pub animal: AnimalType,
    pub payout: u32,
    pub cards: Vec<AnimalCard>,
}

/// Log of every quartet completed this match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuartetTracker {
    completed: Vec<QuartetRecord>,
}

impl QuartetTracker {
    pub fn record(&mut self, record: QuartetRecord) {
        self.completed.push(record);
    }

    #[must_use]
    pub fn completed(&self) -> &[QuartetRecord] {
        &self.completed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Total money the bank has paid out for quartets.
    #[must_use]
    pub fn total_paid(&self) -> u64 {
        self.completed.iter().map(|q| u64::from(q.payout)).sum()
    }

    /// Cards removed from play.
    #[must_use]
    pub fn retired_cards(&self) -> usize {
        self.completed.iter().map(|q| q.cards.len()).sum()
    }

    /// Quartets scored by one player.
    pub fn by_owner(&self, owner: PlayerId) -> impl Iterator<Item = &QuartetRecord> {
        self.completed.iter().filter(move |q| q.owner == owner)
    }
}

/// The draw pile. Front is drawn next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vector<AnimalCard>,
    quartets: QuartetTracker,
}

impl Deck {
    /// Build an unshuffled deck with four copies of each listed animal.
    #[must_use]
    pub fn new(animals: &[AnimalType]) -> Self {
        let mut cards = Vector::new();
        let mut next_id = 0u16;
        for &animal in animals {
            for rank in 0..CARDS_PER_ANIMAL {
                cards.push_back(AnimalCard::new(CardId(next_id), animal, rank));
                next_id += 1;
            }
        }
        Self {
            cards,
            quartets: QuartetTracker::default(),
        }
    }

    /// Build a deck in exactly the given order (front first).
    #[must_use]
    pub fn stacked(cards: impl IntoIterator<Item = AnimalCard>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            quartets: QuartetTracker::default(),
        }
    }

    /// Shuffle the remaining cards in place.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        let mut cards: Vec<AnimalCard> = self.cards.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.cards = cards.into_iter().collect();
    }

    /// Remove and return the top card, or `None` if the deck is empty.
    pub fn draw(&mut self) -> Option<AnimalCard> {
        self.cards.pop_front()
    }

    /// Look at the top card without drawing it.
    #[must_use]
    pub fn peek(&self) -> Option<&AnimalCard> {
        self.cards.front()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn quartets(&self) -> &QuartetTracker {
        &self.quartets
    }

    pub fn record_quartet(&mut self, record: QuartetRecord) {
        self.quartets.record(record);
    }
}
