//! Animal kinds and the cards that carry them.

use serde::{Deserialize, Serialize};

/// Every animal kind in the game, cheapest quartet first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnimalType {
    Rooster,
    Goose,
    Cat,
    Dog,
    Sheep,
    Goat,
    Donkey,
    Pig,
    Cow,
    Horse,
}

impl AnimalType {
    /// Number of animal kinds.
    pub const COUNT: usize = 10;

    /// All kinds in ascending value order.
    pub const ALL: [AnimalType; Self::COUNT] = [
        AnimalType::Rooster,
        AnimalType::Goose,
        AnimalType::Cat,
        AnimalType::Dog,
        AnimalType::Sheep,
        AnimalType::Goat,
        AnimalType::Donkey,
        AnimalType::Pig,
        AnimalType::Cow,
        AnimalType::Horse,
    ];

    /// Dense index (0..COUNT), used for herd counters and mask layout.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`AnimalType::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AnimalType::Rooster => "Rooster",
            AnimalType::Goose => "Goose",
            AnimalType::Cat => "Cat",
            AnimalType::Dog => "Dog",
            AnimalType::Sheep => "Sheep",
            AnimalType::Goat => "Goat",
            AnimalType::Donkey => "Donkey",
            AnimalType::Pig => "Pig",
            AnimalType::Cow => "Cow",
            AnimalType::Horse => "Horse",
        }
    }

    /// Quartet payout in the standard edition.
    #[must_use]
    pub const fn standard_quartet_value(self) -> u32 {
        match self {
            AnimalType::Rooster => 10,
            AnimalType::Goose => 40,
            AnimalType::Cat => 90,
            AnimalType::Dog => 160,
            AnimalType::Sheep => 250,
            AnimalType::Goat => 350,
            AnimalType::Donkey => 500,
            AnimalType::Pig => 650,
            AnimalType::Cow => 800,
            AnimalType::Horse => 1000,
        }
    }
}

impl std::fmt::Display for AnimalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique instance id, assigned when the deck is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

/// A single animal card. Immutable once created.
///
/// Identity is `(animal, rank)`; `rank` is the copy number within the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimalCard {
    pub id: CardId,
    pub animal: AnimalType,
    pub rank: u8,
}

impl AnimalCard {
    #[must_use]
    pub const fn new(id: CardId, animal: AnimalType, rank: u8) -> Self {
        Self { id, animal, rank }
    }
}

impl std::fmt::Display for AnimalCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.animal, self.rank + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, animal) in AnimalType::ALL.iter().enumerate() {
            assert_eq!(animal.index(), i);
            assert_eq!(AnimalType::from_index(i), Some(*animal));
        }
        assert_eq!(AnimalType::from_index(AnimalType::COUNT), None);
    }

    #[test]
    fn test_standard_values_ascend() {
        let values: Vec<_> = AnimalType::ALL.iter().map(|a| a.standard_quartet_value()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values.iter().sum::<u32>(), 3850);
    }

    #[test]
    fn test_card_display() {
        let card = AnimalCard::new(CardId(3), AnimalType::Horse, 2);
        assert_eq!(card.to_string(), "Horse #3");
    }
}
