//! A player's collected animals (public information).

use serde::{Deserialize, Serialize};

use super::animal::{AnimalCard, AnimalType};
use super::deck::CARDS_PER_ANIMAL;

/// Per-kind card counts, indexed by [`AnimalType::index`].
pub type HerdCounts = [u8; AnimalType::COUNT];

/// The animal cards one player currently owns, plus the quartets it has scored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Herd {
    cards: Vec<AnimalCard>,
    completed: Vec<AnimalType>,
}

impl Herd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card and return the new count for its kind.
    ///
    /// A return value of [`CARDS_PER_ANIMAL`] means a quartet is complete and
    /// must be scored with [`Herd::take_quartet`] before the settlement ends.
    pub fn add(&mut self, card: AnimalCard) -> u8 {
        self.cards.push(card);
        self.count(card.animal)
    }

    /// Number of cards of one kind.
    #[must_use]
    pub fn count(&self, animal: AnimalType) -> u8 {
        self.cards.iter().filter(|c| c.animal == animal).count() as u8
    }

    #[must_use]
    pub fn owns(&self, animal: AnimalType) -> bool {
        self.cards.iter().any(|c| c.animal == animal)
    }

    /// Counts for every kind.
    #[must_use]
    pub fn counts(&self) -> HerdCounts {
        let mut counts = [0u8; AnimalType::COUNT];
        for card in &self.cards {
            counts[card.animal.index()] += 1;
        }
        counts
    }

    /// Remove the most recently acquired card of a kind.
    pub fn remove_one(&mut self, animal: AnimalType) -> Option<AnimalCard> {
        let pos = self.cards.iter().rposition(|c| c.animal == animal)?;
        Some(self.cards.remove(pos))
    }

    /// Remove a complete quartet, remembering that it was scored.
    ///
    /// Returns `None` unless the herd holds exactly four of the kind.
    pub fn take_quartet(&mut self, animal: AnimalType) -> Option<Vec<AnimalCard>> {
        if self.count(animal) != CARDS_PER_ANIMAL {
            return None;
        }
        let (quartet, rest): (Vec<_>, Vec<_>) =
            self.cards.iter().copied().partition(|c| c.animal == animal);
        self.cards = rest;
        self.completed.push(animal);
        Some(quartet)
    }

    /// Kinds with at least one card, in ascending value order.
    pub fn owned_types(&self) -> impl Iterator<Item = AnimalType> + '_ {
        AnimalType::ALL.into_iter().filter(move |&a| self.owns(a))
    }

    #[must_use]
    pub fn cards(&self) -> &[AnimalCard] {
        &self.cards
    }

    /// Quartets this herd has completed, in completion order.
    #[must_use]
    pub fn completed_quartets(&self) -> &[AnimalType] {
        &self.completed
    }

    /// Value of the completed quartets under a value table.
    #[must_use]
    pub fn quartet_value(&self, value_of: impl Fn(AnimalType) -> u32) -> u64 {
        self.completed.iter().map(|&a| u64::from(value_of(a))).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The first kind whose count is outside 0..4, if any.
    #[must_use]
    pub fn overfull(&self) -> Option<AnimalType> {
        AnimalType::ALL
            .into_iter()
            .find(|&a| self.count(a) >= CARDS_PER_ANIMAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::animal::CardId;

    fn card(id: u16, animal: AnimalType, rank: u8) -> AnimalCard {
        AnimalCard::new(CardId(id), animal, rank)
    }

    #[test]
    fn test_add_returns_running_count() {
        let mut herd = Herd::new();
        assert_eq!(herd.add(card(0, AnimalType::Dog, 0)), 1);
        assert_eq!(herd.add(card(1, AnimalType::Dog, 1)), 2);
        assert_eq!(herd.add(card(2, AnimalType::Cat, 0)), 1);
        assert_eq!(herd.count(AnimalType::Dog), 2);
        assert_eq!(herd.counts()[AnimalType::Cat.index()], 1);
    }

    #[test]
    fn test_take_quartet_requires_four() {
        let mut herd = Herd::new();
        for rank in 0..3 {
            herd.add(card(rank as u16, AnimalType::Pig, rank));
        }
        assert!(herd.take_quartet(AnimalType::Pig).is_none());

        herd.add(card(3, AnimalType::Pig, 3));
        herd.add(card(9, AnimalType::Cow, 0));
        assert_eq!(herd.overfull(), Some(AnimalType::Pig));

        let quartet = herd.take_quartet(AnimalType::Pig).unwrap();
        assert_eq!(quartet.len(), 4);
        assert_eq!(herd.count(AnimalType::Pig), 0);
        assert_eq!(herd.count(AnimalType::Cow), 1);
        assert_eq!(herd.completed_quartets(), &[AnimalType::Pig]);
        assert_eq!(herd.overfull(), None);
    }

    #[test]
    fn test_remove_one_takes_latest() {
        let mut herd = Herd::new();
        herd.add(card(0, AnimalType::Goat, 0));
        herd.add(card(1, AnimalType::Goat, 1));

        let removed = herd.remove_one(AnimalType::Goat).unwrap();
        assert_eq!(removed.id, CardId(1));
        assert_eq!(herd.count(AnimalType::Goat), 1);
        assert!(herd.remove_one(AnimalType::Horse).is_none());
    }

    #[test]
    fn test_quartet_value_uses_table() {
        let mut herd = Herd::new();
        for rank in 0..4 {
            herd.add(card(rank as u16, AnimalType::Horse, rank));
        }
        herd.take_quartet(AnimalType::Horse);
        assert_eq!(herd.quartet_value(|a| a.standard_quartet_value()), 1000);
        assert_eq!(herd.quartet_value(|_| 5), 5);
    }

    #[test]
    fn test_owned_types_in_value_order() {
        let mut herd = Herd::new();
        herd.add(card(0, AnimalType::Horse, 0));
        herd.add(card(1, AnimalType::Rooster, 0));
        let owned: Vec<_> = herd.owned_types().collect();
        assert_eq!(owned, vec![AnimalType::Rooster, AnimalType::Horse]);
    }
}
