//! Game state.
//!
//! ## Phase
//!
//! Where the match stands. Auctions and duels carry their sub-engine inside
//! the phase, so a state can never hold a duel while an auction is running.
//!
//! ## GameState
//!
//! Complete match state:
//! - Phase, turn, drawer
//! - Money ledger (private note counts, public totals on request)
//! - Deck and quartet tracker
//! - Herds (public)
//! - Action history
//!
//! The state holds no RNG: the deck is shuffled once at reset and every later
//! transition is deterministic, so equal states serialize to equal bytes.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionRecord};
use super::player::{PlayerId, PlayerMap};
use crate::auction::AuctionEngine;
use crate::cards::{AnimalCard, Deck, Herd, CARDS_PER_ANIMAL};
use crate::duel::DuelEngine;
use crate::ledger::Ledger;

/// Current phase, with the running sub-engine if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Dealt but not yet started.
    Setup,
    /// The drawer must draw (or, with duels replacing auctions, challenge).
    TurnStart,
    Auctioning(AuctionEngine),
    /// After an auction the drawer may start one duel or pass.
    DuelOffer,
    Dueling(DuelEngine),
    Terminal,
    /// The engine detected an inconsistent state and stopped.
    Aborted { reason: String },
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Setup => PhaseKind::Setup,
            Phase::TurnStart => PhaseKind::TurnStart,
            Phase::Auctioning(_) => PhaseKind::Auctioning,
            Phase::DuelOffer => PhaseKind::DuelOffer,
            Phase::Dueling(_) => PhaseKind::Dueling,
            Phase::Terminal => PhaseKind::Terminal,
            Phase::Aborted { .. } => PhaseKind::Aborted,
        }
    }

    /// The running auction, if any.
    #[must_use]
    pub fn auction(&self) -> Option<&AuctionEngine> {
        match self {
            Phase::Auctioning(auction) => Some(auction),
            _ => None,
        }
    }

    /// The running duel, if any.
    #[must_use]
    pub fn duel(&self) -> Option<&DuelEngine> {
        match self {
            Phase::Dueling(duel) => Some(duel),
            _ => None,
        }
    }
}

/// Phase without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Setup,
    TurnStart,
    Auctioning,
    DuelOffer,
    Dueling,
    Terminal,
    Aborted,
}

impl PhaseKind {
    /// Number of phase kinds (for one-hot encodings).
    pub const COUNT: usize = 7;

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_over(self) -> bool {
        matches!(self, PhaseKind::Terminal | PhaseKind::Aborted)
    }
}

/// Full match state.
///
/// Uses `im` persistent vectors for the deck and history so that the state
/// machine's clone-then-commit step stays cheap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) seed: u64,
    pub(crate) phase: Phase,
    pub(crate) drawer: PlayerId,
    /// 0-based turn counter.
    pub(crate) turn: u32,
    pub(crate) ledger: Ledger,
    pub(crate) deck: Deck,
    pub(crate) herds: PlayerMap<Herd>,
    /// Cards in the deck at reset.
    pub(crate) total_cards: usize,
    pub(crate) history: Vector<ActionRecord>,
    pub(crate) sequence: u32,
}

impl GameState {
    /// Create a state in [`Phase::Setup`] from a dealt ledger and a shuffled deck.
    #[must_use]
    pub fn new(seed: u64, ledger: Ledger, deck: Deck) -> Self {
        let player_count = ledger.player_count();
        Self {
            seed,
            phase: Phase::Setup,
            drawer: PlayerId::new(0),
            turn: 0,
            total_cards: deck.remaining(),
            ledger,
            deck,
            herds: PlayerMap::with_default(player_count),
            history: Vector::new(),
            sequence: 0,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.ledger.player_count()
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Seat whose turn it is to draw.
    #[must_use]
    pub fn drawer(&self) -> PlayerId {
        self.drawer
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn herds(&self) -> &PlayerMap<Herd> {
        &self.herds
    }

    /// A seat's herd.
    ///
    /// # Panics
    ///
    /// Panics if `player` is not seated.
    #[must_use]
    pub fn herd(&self, player: PlayerId) -> &Herd {
        &self.herds[player]
    }

    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.kind().is_over()
    }

    /// Total money per seat. This is the match score.
    #[must_use]
    pub fn scores(&self) -> PlayerMap<u64> {
        PlayerMap::new(self.player_count(), |p| self.ledger.total_value(p))
    }

    /// The card currently under the hammer.
    #[must_use]
    pub fn card_in_auction(&self) -> Option<AnimalCard> {
        self.phase.auction().map(AuctionEngine::card)
    }

    /// Append an action to the history.
    pub(crate) fn record(&mut self, player: PlayerId, action: Action) {
        let record = ActionRecord::new(player, action, self.turn, self.sequence);
        self.sequence += 1;
        self.history.push_back(record);
    }

    /// Check every structural invariant; returns the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.ledger.check_conservation()?;

        for (player, herd) in self.herds.iter() {
            if let Some(animal) = herd.overfull() {
                return Err(format!(
                    "{player} holds {} {animal} cards outside a quartet",
                    herd.count(animal)
                ));
            }
        }

        let in_herds: usize = self.herds.values().map(Herd::len).sum();
        let in_auction = usize::from(self.card_in_auction().is_some());
        let located = self.deck.remaining()
            + in_herds
            + in_auction
            + self.deck.quartets().retired_cards();
        if located != self.total_cards {
            return Err(format!(
                "{located} cards accounted for, {} dealt",
                self.total_cards
            ));
        }

        let scored: usize = self.herds.values().map(|h| h.completed_quartets().len()).sum();
        if scored * usize::from(CARDS_PER_ANIMAL) != self.deck.quartets().retired_cards() {
            return Err("quartet tracker disagrees with herds".into());
        }

        Ok(())
    }

    /// Multi-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Turn {} | drawer {} | {:?} | deck {} left\n",
            self.turn,
            self.drawer,
            self.phase.kind(),
            self.deck.remaining()
        );
        if let Some(auction) = self.phase.auction() {
            let leader = auction
                .leader()
                .map_or_else(|| "nobody".to_string(), |p| p.to_string());
            out.push_str(&format!(
                "  auction: {} at {} by {leader}\n",
                auction.card(),
                auction.high_bid()
            ));
        }
        if let Some(duel) = self.phase.duel() {
            out.push_str(&format!(
                "  duel: {} vs {} over {}\n",
                duel.challenger(),
                duel.defender(),
                duel.animal()
            ));
        }
        for (player, herd) in self.herds.iter() {
            let animals: Vec<String> = herd
                .owned_types()
                .map(|a| format!("{a} x{}", herd.count(a)))
                .collect();
            out.push_str(&format!(
                "  {player}: {} ({}) | {} | quartets {}\n",
                self.ledger.total_value(player),
                self.ledger.balance(player),
                if animals.is_empty() { "-".to_string() } else { animals.join(", ") },
                herd.completed_quartets().len()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::AnimalType;
    use crate::ledger::Notes;

    fn state() -> GameState {
        let ledger = Ledger::deal(3, &[0, 10, 50], &Notes::from_counts([(0, 2), (10, 4), (50, 1)]));
        GameState::new(7, ledger, Deck::new(&AnimalType::ALL))
    }

    #[test]
    fn test_new_state() {
        let state = state();
        assert_eq!(state.player_count(), 3);
        assert_eq!(state.phase_kind(), PhaseKind::Setup);
        assert_eq!(state.total_cards, 40);
        assert_eq!(state.scores().values().copied().collect::<Vec<_>>(), vec![90, 90, 90]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_lost_card_is_detected() {
        let mut state = state();
        state.deck.draw();
        assert!(state.check_invariants().is_err());
    }

    #[test]
    fn test_overfull_herd_is_detected() {
        let mut state = state();
        while let Some(card) = state.deck.draw() {
            if card.animal == AnimalType::Dog {
                state.herds[PlayerId::new(0)].add(card);
            } else {
                state.herds[PlayerId::new(1)].add(card);
            }
        }
        let err = state.check_invariants().unwrap_err();
        assert!(err.contains("Dog"), "{err}");
    }

    #[test]
    fn test_history_sequence() {
        let mut state = state();
        state.record(PlayerId::new(0), Action::Draw);
        state.record(PlayerId::new(1), Action::Pass);
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[1].sequence, 1);
    }

    #[test]
    fn test_summary_mentions_every_player() {
        let summary = state().summary();
        for p in 0..3 {
            assert!(summary.contains(&format!("Player {p}")));
        }
    }
}
