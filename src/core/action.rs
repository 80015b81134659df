//! Player actions and the action history.
//!
//! Every decision a seat can make is one [`Action`] variant. Which variants
//! are legal depends on the phase:
//! - turn start: `Draw`, or `Challenge` when duels replace auctions
//! - auctioning: `Raise` or `Pass` by the bidder to act
//! - duel offer: `Challenge` or `Pass` by the drawer
//! - dueling: `SubmitDuelBid` by either participant

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::cards::AnimalType;
use crate::duel::DuelStack;
use crate::ledger::Notes;

/// A complete game action.
///
/// ```
/// use kuhhandel::cards::AnimalType;
/// use kuhhandel::core::{Action, PlayerId};
///
/// let raise = Action::Raise { amount: 30 };
/// let challenge = Action::Challenge { defender: PlayerId::new(2), animal: AnimalType::Cow };
/// assert_ne!(raise, challenge);
/// assert_eq!(raise.to_string(), "raise to 30");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Drop out of the auction, or decline to duel.
    Pass,
    /// Reveal the top card of the deck for auction.
    Draw,
    /// Bid `amount` in the running auction.
    Raise { amount: u32 },
    /// Start a duel against `defender` over one of `animal`.
    Challenge {
        defender: PlayerId,
        animal: AnimalType,
    },
    /// Commit a sealed stack of notes in the running duel.
    SubmitDuelBid(DuelStack),
}

impl Action {
    /// A duel bid showing the smallest note on top.
    #[must_use]
    pub fn duel_bid(notes: Notes) -> Self {
        Action::SubmitDuelBid(DuelStack::new(notes))
    }

    /// Short name of the variant, for logs and counters.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Pass => "pass",
            Action::Draw => "draw",
            Action::Raise { .. } => "raise",
            Action::Challenge { .. } => "challenge",
            Action::SubmitDuelBid(_) => "duel_bid",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Pass => f.write_str("pass"),
            Action::Draw => f.write_str("draw"),
            Action::Raise { amount } => write!(f, "raise to {amount}"),
            Action::Challenge { defender, animal } => write!(f, "challenge {defender} over {animal}"),
            Action::SubmitDuelBid(stack) => write!(f, "duel bid of {} note(s)", stack.note_count()),
        }
    }
}

/// A recorded action with metadata for history tracking.
///
/// Used for:
/// - Replay/debugging
/// - Training data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number across the match (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        let a1 = Action::Raise { amount: 10 };
        let a2 = Action::Raise { amount: 10 };
        let a3 = Action::Raise { amount: 20 };

        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
        assert_ne!(Action::Pass, Action::Draw);
    }

    #[test]
    fn test_action_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |a: &Action| {
            let mut h = DefaultHasher::new();
            a.hash(&mut h);
            h.finish()
        };

        let a1 = Action::duel_bid(Notes::from_counts([(10, 2)]));
        let a2 = Action::duel_bid(Notes::from_counts([(10, 2)]));
        let a3 = Action::duel_bid(Notes::from_counts([(10, 3)]));

        assert_eq!(hash(&a1), hash(&a2));
        assert_ne!(hash(&a1), hash(&a3));
    }

    #[test]
    fn test_action_kind() {
        assert_eq!(Action::Pass.kind(), "pass");
        assert_eq!(
            Action::Challenge {
                defender: PlayerId::new(1),
                animal: AnimalType::Dog
            }
            .kind(),
            "challenge"
        );
    }

    #[test]
    fn test_action_record() {
        let action = Action::Raise { amount: 40 };
        let record = ActionRecord::new(PlayerId::new(0), action.clone(), 3, 5);

        assert_eq!(record.player, PlayerId::new(0));
        assert_eq!(record.action, action);
        assert_eq!(record.turn, 3);
        assert_eq!(record.sequence, 5);
    }

    #[test]
    fn test_action_serde_json() {
        let action = Action::Challenge {
            defender: PlayerId::new(2),
            animal: AnimalType::Goat,
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
