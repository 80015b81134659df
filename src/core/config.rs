//! Rule configuration.
//!
//! Rule editions differ in money, values, and duel handling, so every variant
//! is a field of [`RulesConfig`]. The config is validated once, handed to the
//! state machine at reset, and never mutated during a match.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::cards::AnimalType;
use crate::ledger::Notes;

/// Fewest seats the rule table supports.
pub const MIN_PLAYERS: usize = 3;
/// Most seats the rule table supports.
pub const MAX_PLAYERS: usize = 5;

/// Who keeps the card when both duel stacks are worth the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreak {
    #[default]
    DefenderWins,
    ChallengerWins,
}

/// How auctions and duels interleave within a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnStructure {
    /// Every turn auctions the top card; afterwards the drawer may start one duel.
    #[default]
    DuelAfterAuction,
    /// The drawer either draws for an auction or starts a duel.
    DuelInsteadOfAuction,
}

/// What happens to a raise the rules reject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IllegalBidPolicy {
    /// Reject it; the bidder is asked again.
    #[default]
    Reject,
    /// Treat it as a pass by the bidder to act.
    ForfeitToPass,
}

/// Immutable rule set for one match.
///
/// ```
/// use kuhhandel::core::{RulesConfig, TieBreak};
///
/// let config = RulesConfig::default()
///     .with_players(4)
///     .with_tie_break(TieBreak::ChallengerWins);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.quartet_value(kuhhandel::cards::AnimalType::Horse), 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Number of seats.
    pub num_players: usize,

    /// Whether a payee returns change for an overpayment.
    pub give_change: bool,

    pub tie_break: TieBreak,

    pub duel_enabled: bool,

    pub turn_structure: TurnStructure,

    /// Quartet payout per animal kind.
    pub quartet_values: FxHashMap<AnimalType, u32>,

    /// Kinds in the deck; each contributes four cards.
    pub animals: Vec<AnimalType>,

    /// Face values of money notes.
    pub denominations: Vec<u32>,

    /// Notes dealt to every seat at reset.
    pub starting_notes: Notes,

    /// Raises must be multiples of this.
    pub bid_increment: u32,

    /// Price the drawer pays when nobody bids.
    pub auction_floor: u32,

    pub illegal_bid_policy: IllegalBidPolicy,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            num_players: MIN_PLAYERS,
            give_change: false,
            tie_break: TieBreak::default(),
            duel_enabled: true,
            turn_structure: TurnStructure::default(),
            quartet_values: AnimalType::ALL
                .into_iter()
                .map(|a| (a, a.standard_quartet_value()))
                .collect(),
            animals: AnimalType::ALL.to_vec(),
            denominations: vec![0, 10, 50, 100, 200, 500],
            starting_notes: Notes::from_counts([(0, 2), (10, 4), (50, 1)]),
            bid_increment: 10,
            auction_floor: 0,
            illegal_bid_policy: IllegalBidPolicy::default(),
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub fn with_players(mut self, count: usize) -> Self {
        self.num_players = count;
        self
    }

    #[must_use]
    pub fn with_give_change(mut self, give_change: bool) -> Self {
        self.give_change = give_change;
        self
    }

    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    #[must_use]
    pub fn with_duels(mut self, enabled: bool) -> Self {
        self.duel_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_turn_structure(mut self, structure: TurnStructure) -> Self {
        self.turn_structure = structure;
        self
    }

    /// Restrict the deck to the given kinds.
    #[must_use]
    pub fn with_animals(mut self, animals: impl Into<Vec<AnimalType>>) -> Self {
        self.animals = animals.into();
        self
    }

    #[must_use]
    pub fn with_quartet_value(mut self, animal: AnimalType, value: u32) -> Self {
        self.quartet_values.insert(animal, value);
        self
    }

    #[must_use]
    pub fn with_starting_notes(mut self, notes: Notes) -> Self {
        self.starting_notes = notes;
        self
    }

    #[must_use]
    pub fn with_bid_increment(mut self, increment: u32) -> Self {
        self.bid_increment = increment;
        self
    }

    #[must_use]
    pub fn with_auction_floor(mut self, floor: u32) -> Self {
        self.auction_floor = floor;
        self
    }

    #[must_use]
    pub fn with_illegal_bid_policy(mut self, policy: IllegalBidPolicy) -> Self {
        self.illegal_bid_policy = policy;
        self
    }

    /// Quartet payout for a kind (0 if unconfigured; `validate` rejects that).
    #[must_use]
    pub fn quartet_value(&self, animal: AnimalType) -> u32 {
        self.quartet_values.get(&animal).copied().unwrap_or(0)
    }

    /// Total cards in the deck at reset.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.animals.len() * usize::from(crate::cards::CARDS_PER_ANIMAL)
    }

    /// Check that a match can start under this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount {
                count: self.num_players,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }
        if self.bid_increment == 0 {
            return Err(ConfigError::ZeroIncrement);
        }
        if self.animals.is_empty() {
            return Err(ConfigError::EmptyDeck);
        }
        for (i, animal) in self.animals.iter().enumerate() {
            if self.animals[..i].contains(animal) {
                return Err(ConfigError::DuplicateAnimal(*animal));
            }
            if !self.quartet_values.contains_key(animal) {
                return Err(ConfigError::MissingQuartetValue(*animal));
            }
        }
        if let Some((value, _)) = self
            .starting_notes
            .iter()
            .find(|(v, _)| !self.denominations.contains(v))
        {
            return Err(ConfigError::UnknownDenomination(value));
        }
        if !self.denominations.iter().any(|&d| d > 0) {
            return Err(ConfigError::NoPositiveDenomination);
        }

        // The bank mints these amounts and must hit them exactly.
        let quartets = self
            .animals
            .iter()
            .map(|&animal| (format!("{animal} quartet value"), self.quartet_value(animal)));
        let amounts = quartets.chain([
            ("auction floor".to_string(), self.auction_floor),
            ("bid increment".to_string(), self.bid_increment),
        ]);
        for (what, amount) in amounts {
            let amount = u64::from(amount);
            if Notes::mint(amount, &self.denominations).is_none() {
                return Err(ConfigError::Unrepresentable { what, amount });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON rule set. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard_edition() {
        let config = RulesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deck_size(), 40);
        assert_eq!(config.starting_notes.total_value(), 90);
        assert_eq!(config.quartet_value(AnimalType::Rooster), 10);
        assert_eq!(config.tie_break, TieBreak::DefenderWins);
        assert!(!config.give_change);
    }

    #[test]
    fn test_player_count_range() {
        for count in [1, 2, 6, 10] {
            let err = RulesConfig::default().with_players(count).validate().unwrap_err();
            assert!(matches!(err, ConfigError::PlayerCount { .. }));
        }
        for count in MIN_PLAYERS..=MAX_PLAYERS {
            assert!(RulesConfig::default().with_players(count).validate().is_ok());
        }
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut missing = RulesConfig::default();
        missing.quartet_values.remove(&AnimalType::Cow);
        assert_eq!(missing.validate(), Err(ConfigError::MissingQuartetValue(AnimalType::Cow)));

        let dup = RulesConfig::default().with_animals(vec![AnimalType::Cat, AnimalType::Cat]);
        assert_eq!(dup.validate(), Err(ConfigError::DuplicateAnimal(AnimalType::Cat)));

        let empty = RulesConfig::default().with_animals(Vec::new());
        assert_eq!(empty.validate(), Err(ConfigError::EmptyDeck));

        let odd = RulesConfig::default().with_starting_notes(Notes::from_counts([(25, 1)]));
        assert_eq!(odd.validate(), Err(ConfigError::UnknownDenomination(25)));

        let zero = RulesConfig::default().with_bid_increment(0);
        assert_eq!(zero.validate(), Err(ConfigError::ZeroIncrement));
    }

    #[test]
    fn test_rejects_unpayable_money_tables() {
        let mut no_tens = RulesConfig::default()
            .with_starting_notes(Notes::from_counts([(0, 2), (50, 4)]))
            .with_bid_increment(50);
        no_tens.denominations = vec![0, 50, 100, 200, 500];
        assert_eq!(
            no_tens.validate(),
            Err(ConfigError::Unrepresentable {
                what: "Rooster quartet value".into(),
                amount: 10,
            })
        );

        let mut zeros = RulesConfig::default().with_starting_notes(Notes::from_counts([(0, 3)]));
        zeros.denominations = vec![0];
        assert_eq!(zeros.validate(), Err(ConfigError::NoPositiveDenomination));

        let floor = RulesConfig::default().with_auction_floor(15);
        assert!(matches!(
            floor.validate(),
            Err(ConfigError::Unrepresentable { amount: 15, .. })
        ));

        let increment = RulesConfig::default().with_bid_increment(25);
        assert!(matches!(
            increment.validate(),
            Err(ConfigError::Unrepresentable { amount: 25, .. })
        ));
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let config = RulesConfig::default()
            .with_players(5)
            .with_give_change(true)
            .with_turn_structure(TurnStructure::DuelInsteadOfAuction);
        let json = config.to_json().unwrap();
        assert_eq!(RulesConfig::from_json(&json).unwrap(), config);

        let partial = RulesConfig::from_json(r#"{"num_players": 4, "tie_break": "ChallengerWins"}"#).unwrap();
        assert_eq!(partial.num_players, 4);
        assert_eq!(partial.tie_break, TieBreak::ChallengerWins);
        assert_eq!(partial.animals.len(), 10);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            RulesConfig::from_json(r#"{"num_players": 9}"#),
            Err(ConfigError::PlayerCount { count: 9, .. })
        ));
        assert!(matches!(RulesConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }
}
