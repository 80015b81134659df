//! Events emitted by the state machine.
//!
//! One accepted action can cascade (a pass closes an auction, which moves a
//! card, which completes a quartet, which ends the turn). Each step becomes an
//! event so callers can replay or log the match without diffing states.

use serde::{Deserialize, Serialize};

use super::error::IllegalAction;
use super::player::{PlayerId, PlayerMap};
use crate::cards::{AnimalCard, AnimalType};
use crate::ledger::Notes;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CardDrawn {
        drawer: PlayerId,
        card: AnimalCard,
    },
    BidRaised {
        player: PlayerId,
        amount: u32,
    },
    BidderPassed {
        player: PlayerId,
    },
    /// An illegal raise was turned into a pass.
    BidForfeited {
        player: PlayerId,
        reason: IllegalAction,
    },
    AuctionWon {
        winner: PlayerId,
        drawer: PlayerId,
        card: AnimalCard,
        price: u32,
        paid: Notes,
        change: Notes,
    },
    /// Nobody bid; the drawer paid the floor to the bank.
    SelfBought {
        drawer: PlayerId,
        card: AnimalCard,
        price: u32,
    },
    DuelDeclined {
        player: PlayerId,
    },
    DuelStarted {
        challenger: PlayerId,
        defender: PlayerId,
        animal: AnimalType,
    },
    /// Only the public part of a sealed bid.
    DuelBidCommitted {
        player: PlayerId,
        note_count: u32,
        top: Option<u32>,
    },
    DuelRevealed {
        challenger_bid: Notes,
        defender_bid: Notes,
        winner: PlayerId,
    },
    CardTransferred {
        from: PlayerId,
        to: PlayerId,
        card: AnimalCard,
    },
    QuartetCompleted {
        player: PlayerId,
        animal: AnimalType,
        payout: u32,
    },
    TurnEnded {
        next_drawer: PlayerId,
        turn: u32,
    },
    GameOver {
        scores: PlayerMap<u64>,
    },
}

impl GameEvent {
    /// Whether this event ends the match.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. })
    }
}
