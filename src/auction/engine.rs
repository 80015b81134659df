//! Ascending open auction for one drawn card.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::AnimalCard;
use crate::core::{IllegalAction, PlayerId};
use crate::ledger::{Holder, Ledger, LedgerError, Payment};

/// Bidders in one auction (every seat but the drawer).
pub type Bidders = SmallVec<[PlayerId; 4]>;

/// Where an auction stands after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuctionStatus {
    /// Waiting on `to_act`.
    Open { to_act: PlayerId },
    /// No bidder other than the leader remains.
    Closed(AuctionResult),
}

/// Final result of an auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionResult {
    pub card: AnimalCard,
    pub drawer: PlayerId,
    pub winner: PlayerId,
    pub price: u32,
    /// Nobody bid; the drawer took the card at the floor price.
    pub self_bought: bool,
}

impl AuctionResult {
    /// Who receives the price.
    #[must_use]
    pub fn payee(&self) -> Holder {
        if self.self_bought {
            Holder::Bank
        } else {
            Holder::Player(self.drawer)
        }
    }

    /// Move the price through the ledger.
    pub fn settle(&self, ledger: &mut Ledger, give_change: bool) -> Result<Payment, LedgerError> {
        ledger.pay(
            Holder::Player(self.winner),
            self.payee(),
            u64::from(self.price),
            give_change,
        )
    }
}

/// One English auction.
///
/// Bidders are offered the floor in seat order starting left of the drawer.
/// The current leader is skipped; a pass is final.
///
/// The auction closes once no active bidder other than the leader remains.
/// Before any bid, the last bidder standing must still raise or pass; if
/// everyone passes, the drawer buys the card at the floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionEngine {
    card: AnimalCard,
    drawer: PlayerId,
    floor: u32,
    high_bid: u32,
    leader: Option<PlayerId>,
    order: Bidders,
    active: Bidders,
    to_act: Option<PlayerId>,
}

impl AuctionEngine {
    /// Open an auction. `floor` is what the drawer pays if nobody bids.
    #[must_use]
    pub fn open(card: AnimalCard, drawer: PlayerId, player_count: usize, floor: u32) -> Self {
        let order: Bidders = drawer.others_in_turn_order(player_count).collect();
        Self {
            card,
            drawer,
            floor,
            high_bid: 0,
            leader: None,
            active: order.clone(),
            to_act: order.first().copied(),
            order,
        }
    }

    #[must_use]
    pub fn card(&self) -> AnimalCard {
        self.card
    }

    #[must_use]
    pub fn drawer(&self) -> PlayerId {
        self.drawer
    }

    #[must_use]
    pub fn high_bid(&self) -> u32 {
        self.high_bid
    }

    #[must_use]
    pub fn leader(&self) -> Option<PlayerId> {
        self.leader
    }

    /// Bidders who have not passed, in bidding order.
    #[must_use]
    pub fn active_bidders(&self) -> &[PlayerId] {
        &self.active
    }

    #[must_use]
    pub fn to_act(&self) -> Option<PlayerId> {
        self.to_act
    }

    /// Validate a raise without applying it.
    ///
    /// `available` is the bidder's total money; nobody may bid more than they
    /// could pay.
    pub fn check_raise(
        &self,
        player: PlayerId,
        amount: u32,
        increment: u32,
        available: u64,
    ) -> Result<(), IllegalAction> {
        self.check_turn(player)?;
        if amount <= self.high_bid {
            return Err(IllegalAction::BidTooLow {
                amount,
                high_bid: self.high_bid,
            });
        }
        if increment == 0 || amount % increment != 0 {
            return Err(IllegalAction::BidNotMultiple { amount, increment });
        }
        if u64::from(amount) > available {
            return Err(IllegalAction::InsufficientFunds(LedgerError::CannotCover {
                holder: Holder::Player(player),
                owed: u64::from(amount),
                available,
            }));
        }
        Ok(())
    }

    /// Raise the high bid.
    pub fn raise(
        &mut self,
        player: PlayerId,
        amount: u32,
        increment: u32,
        available: u64,
    ) -> Result<AuctionStatus, IllegalAction> {
        self.check_raise(player, amount, increment, available)?;
        self.high_bid = amount;
        self.leader = Some(player);
        self.advance(player);
        Ok(self.status())
    }

    /// Validate a pass without applying it.
    pub fn check_pass(&self, player: PlayerId) -> Result<(), IllegalAction> {
        self.check_turn(player)
    }

    /// Drop out for the rest of this auction.
    pub fn pass(&mut self, player: PlayerId) -> Result<AuctionStatus, IllegalAction> {
        self.check_pass(player)?;
        self.active.retain(|p| *p != player);
        self.advance(player);
        Ok(self.status())
    }

    #[must_use]
    pub fn status(&self) -> AuctionStatus {
        match self.to_act {
            Some(to_act) => AuctionStatus::Open { to_act },
            None => AuctionStatus::Closed(self.result()),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.to_act.is_none()
    }

    /// The result if the auction closed now.
    #[must_use]
    pub fn result(&self) -> AuctionResult {
        match self.leader {
            Some(winner) => AuctionResult {
                card: self.card,
                drawer: self.drawer,
                winner,
                price: self.high_bid,
                self_bought: false,
            },
            None => AuctionResult {
                card: self.card,
                drawer: self.drawer,
                winner: self.drawer,
                price: self.floor,
                self_bought: true,
            },
        }
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), IllegalAction> {
        if self.to_act == Some(player) {
            Ok(())
        } else {
            Err(IllegalAction::NotYourTurn(player))
        }
    }

    /// Hand the turn to the next active non-leader after `after`.
    fn advance(&mut self, after: PlayerId) {
        let start = self
            .order
            .iter()
            .position(|p| *p == after)
            .map_or(0, |i| i + 1);
        let len = self.order.len();
        self.to_act = (0..len)
            .map(|offset| self.order[(start + offset) % len])
            .find(|p| self.active.contains(p) && Some(*p) != self.leader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{AnimalType, CardId};

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    fn horse() -> AnimalCard {
        AnimalCard::new(CardId(0), AnimalType::Horse, 0)
    }

    #[test]
    fn test_bidding_starts_left_of_drawer() {
        let auction = AuctionEngine::open(horse(), p(1), 4, 0);
        assert_eq!(auction.active_bidders(), &[p(2), p(3), p(0)]);
        assert_eq!(auction.to_act(), Some(p(2)));
    }

    #[test]
    fn test_everyone_passes_drawer_self_buys() {
        let mut auction = AuctionEngine::open(horse(), p(0), 3, 0);
        assert_eq!(auction.pass(p(1)).unwrap(), AuctionStatus::Open { to_act: p(2) });

        let AuctionStatus::Closed(result) = auction.pass(p(2)).unwrap() else {
            panic!("auction should close");
        };
        assert!(result.self_bought);
        assert_eq!(result.winner, p(0));
        assert_eq!(result.price, 0);
        assert_eq!(result.payee(), Holder::Bank);
    }

    #[test]
    fn test_last_bidder_after_bid_wins() {
        let mut auction = AuctionEngine::open(horse(), p(0), 3, 0);
        auction.raise(p(1), 10, 10, 90).unwrap();
        assert_eq!(auction.to_act(), Some(p(2)));

        auction.raise(p(2), 30, 10, 90).unwrap();
        assert_eq!(auction.to_act(), Some(p(1)));

        auction.raise(p(1), 50, 10, 90).unwrap();
        let AuctionStatus::Closed(result) = auction.pass(p(2)).unwrap() else {
            panic!("auction should close");
        };
        assert_eq!(result.winner, p(1));
        assert_eq!(result.price, 50);
        assert!(!result.self_bought);
        assert_eq!(result.payee(), Holder::Player(p(0)));
    }

    #[test]
    fn test_leader_is_skipped() {
        let mut auction = AuctionEngine::open(horse(), p(0), 4, 0);
        auction.raise(p(1), 10, 10, 90).unwrap();
        auction.pass(p(2)).unwrap();
        assert_eq!(auction.to_act(), Some(p(3)));
        // p3 passes; only the leader remains.
        assert!(matches!(auction.pass(p(3)).unwrap(), AuctionStatus::Closed(_)));
    }

    #[test]
    fn test_single_bidder_must_still_act_before_any_bid() {
        let mut auction = AuctionEngine::open(horse(), p(0), 3, 0);
        auction.pass(p(1)).unwrap();
        // p2 is the last active bidder but nobody leads yet.
        assert_eq!(auction.to_act(), Some(p(2)));
        let AuctionStatus::Closed(result) = auction.raise(p(2), 10, 10, 90).unwrap() else {
            panic!("auction should close once p2 leads alone");
        };
        assert_eq!(result.winner, p(2));
        assert_eq!(result.price, 10);
    }

    #[test]
    fn test_rejected_raises_leave_state() {
        let mut auction = AuctionEngine::open(horse(), p(0), 3, 0);
        auction.raise(p(1), 20, 10, 90).unwrap();
        let before = auction.clone();

        assert_eq!(
            auction.raise(p(2), 20, 10, 90),
            Err(IllegalAction::BidTooLow { amount: 20, high_bid: 20 })
        );
        assert_eq!(
            auction.raise(p(2), 25, 10, 90),
            Err(IllegalAction::BidNotMultiple { amount: 25, increment: 10 })
        );
        assert!(matches!(
            auction.raise(p(2), 100, 10, 90),
            Err(IllegalAction::InsufficientFunds(_))
        ));
        assert_eq!(auction.raise(p(1), 30, 10, 90), Err(IllegalAction::NotYourTurn(p(1))));
        assert_eq!(auction.pass(p(0)), Err(IllegalAction::NotYourTurn(p(0))));
        assert_eq!(auction, before);
    }

    #[test]
    fn test_floor_price_on_self_buy() {
        let mut auction = AuctionEngine::open(horse(), p(2), 3, 20);
        auction.pass(p(0)).unwrap();
        auction.pass(p(1)).unwrap();
        let result = auction.result();
        assert!(result.self_bought);
        assert_eq!(result.price, 20);
    }
}
