//! Sealed-bid duel over one animal kind.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::AnimalType;
use crate::core::{IllegalAction, PlayerId, TieBreak};
use crate::ledger::{Ledger, LedgerError, Notes};

/// A committed duel bid: a stack of notes with one face shown on top.
///
/// Only the top note and the number of notes are visible to the opponent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuelStack {
    pub notes: Notes,
    /// Face shown on top; `None` shows the smallest note.
    pub top: Option<u32>,
}

impl DuelStack {
    #[must_use]
    pub fn new(notes: Notes) -> Self {
        Self { notes, top: None }
    }

    #[must_use]
    pub fn with_top(notes: Notes, top: u32) -> Self {
        Self {
            notes,
            top: Some(top),
        }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.notes.total_value()
    }

    #[must_use]
    pub fn note_count(&self) -> u32 {
        self.notes.note_count()
    }

    /// Face the opponent sees, if the stack has any notes.
    #[must_use]
    pub fn visible_top(&self) -> Option<u32> {
        self.top.or_else(|| self.notes.smallest())
    }

    /// Shape checks that do not depend on holdings.
    pub fn check_shape(&self) -> Result<(), IllegalAction> {
        match self.top {
            Some(top) if self.notes.count(top) == 0 => Err(IllegalAction::TopNoteNotInStack(top)),
            _ => Ok(()),
        }
    }
}

/// Side of a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelRole {
    Challenger,
    Defender,
}

/// Progress of a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelPhase {
    AwaitingBothBids,
    AwaitingChallengerBid,
    AwaitingDefenderBid,
    Revealed,
    Settled,
}

/// Result of a revealed duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub challenger: PlayerId,
    pub defender: PlayerId,
    pub animal: AnimalType,
    pub winner: PlayerId,
    pub challenger_bid: Notes,
    pub defender_bid: Notes,
}

impl DuelOutcome {
    #[must_use]
    pub fn challenger_value(&self) -> u64 {
        self.challenger_bid.total_value()
    }

    #[must_use]
    pub fn defender_value(&self) -> u64 {
        self.defender_bid.total_value()
    }

    #[must_use]
    pub fn loser(&self) -> PlayerId {
        if self.winner == self.challenger {
            self.defender
        } else {
            self.challenger
        }
    }

    /// Whether a card changes hands (only when the challenger wins).
    #[must_use]
    pub fn card_moves(&self) -> bool {
        self.winner == self.challenger
    }
}

/// Decide a duel from the two stack values.
///
/// ```
/// use kuhhandel::core::TieBreak;
/// use kuhhandel::duel::{resolve, DuelRole};
///
/// assert_eq!(resolve(120, 90, TieBreak::DefenderWins), DuelRole::Challenger);
/// assert_eq!(resolve(90, 90, TieBreak::DefenderWins), DuelRole::Defender);
/// assert_eq!(resolve(90, 90, TieBreak::ChallengerWins), DuelRole::Challenger);
/// ```
#[must_use]
pub fn resolve(challenger_value: u64, defender_value: u64, tie_break: TieBreak) -> DuelRole {
    use std::cmp::Ordering;

    match challenger_value.cmp(&defender_value) {
        Ordering::Greater => DuelRole::Challenger,
        Ordering::Less => DuelRole::Defender,
        Ordering::Equal => match tie_break {
            TieBreak::ChallengerWins => DuelRole::Challenger,
            TieBreak::DefenderWins => DuelRole::Defender,
        },
    }
}

/// One duel between a challenger and a defender.
///
/// Bids are committed in either order and stay hidden until both are in.
/// Settlement swaps the two stacks through the ledger; moving the card is up
/// to the caller, which owns the herds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelEngine {
    challenger: PlayerId,
    defender: PlayerId,
    animal: AnimalType,
    tie_break: TieBreak,
    challenger_stack: Option<DuelStack>,
    defender_stack: Option<DuelStack>,
    settled: bool,
}

impl DuelEngine {
    #[must_use]
    pub fn start(
        challenger: PlayerId,
        defender: PlayerId,
        animal: AnimalType,
        tie_break: TieBreak,
    ) -> Self {
        Self {
            challenger,
            defender,
            animal,
            tie_break,
            challenger_stack: None,
            defender_stack: None,
            settled: false,
        }
    }

    #[must_use]
    pub fn challenger(&self) -> PlayerId {
        self.challenger
    }

    #[must_use]
    pub fn defender(&self) -> PlayerId {
        self.defender
    }

    #[must_use]
    pub fn animal(&self) -> AnimalType {
        self.animal
    }

    #[must_use]
    pub fn role_of(&self, player: PlayerId) -> Option<DuelRole> {
        if player == self.challenger {
            Some(DuelRole::Challenger)
        } else if player == self.defender {
            Some(DuelRole::Defender)
        } else {
            None
        }
    }

    #[must_use]
    pub fn phase(&self) -> DuelPhase {
        if self.settled {
            return DuelPhase::Settled;
        }
        match (&self.challenger_stack, &self.defender_stack) {
            (None, None) => DuelPhase::AwaitingBothBids,
            (None, Some(_)) => DuelPhase::AwaitingChallengerBid,
            (Some(_), None) => DuelPhase::AwaitingDefenderBid,
            (Some(_), Some(_)) => DuelPhase::Revealed,
        }
    }

    /// Players who still owe a bid.
    #[must_use]
    pub fn pending(&self) -> SmallVec<[PlayerId; 2]> {
        let mut pending = SmallVec::new();
        if self.challenger_stack.is_none() {
            pending.push(self.challenger);
        }
        if self.defender_stack.is_none() {
            pending.push(self.defender);
        }
        pending
    }

    /// The committed stack for a role, if any.
    #[must_use]
    pub fn committed(&self, role: DuelRole) -> Option<&DuelStack> {
        match role {
            DuelRole::Challenger => self.challenger_stack.as_ref(),
            DuelRole::Defender => self.defender_stack.as_ref(),
        }
    }

    /// What others may see of a player's committed stack: note count and top face.
    #[must_use]
    pub fn visible_stack(&self, player: PlayerId) -> Option<(u32, Option<u32>)> {
        let stack = self.committed(self.role_of(player)?)?;
        Some((stack.note_count(), stack.visible_top()))
    }

    /// Validate a bid against the bidder's own holdings without committing it.
    pub fn check_commit(
        &self,
        player: PlayerId,
        stack: &DuelStack,
        ledger: &Ledger,
    ) -> Result<(), IllegalAction> {
        let role = self.role_of(player).ok_or(IllegalAction::NotInDuel(player))?;
        if self.committed(role).is_some() {
            return Err(IllegalAction::AlreadyCommitted(player));
        }
        stack.check_shape()?;
        ledger.validate(player, &stack.notes)?;
        Ok(())
    }

    /// Commit a sealed bid.
    pub fn commit(
        &mut self,
        player: PlayerId,
        stack: DuelStack,
        ledger: &Ledger,
    ) -> Result<DuelPhase, IllegalAction> {
        self.check_commit(player, &stack, ledger)?;
        match self.role_of(player) {
            Some(DuelRole::Challenger) => self.challenger_stack = Some(stack),
            Some(DuelRole::Defender) => self.defender_stack = Some(stack),
            None => return Err(IllegalAction::NotInDuel(player)),
        }
        Ok(self.phase())
    }

    /// Reveal both stacks. `None` until both are committed.
    #[must_use]
    pub fn reveal(&self) -> Option<DuelOutcome> {
        let (challenger, defender) = (self.challenger_stack.as_ref()?, self.defender_stack.as_ref()?);
        let winner = match resolve(challenger.value(), defender.value(), self.tie_break) {
            DuelRole::Challenger => self.challenger,
            DuelRole::Defender => self.defender,
        };
        Some(DuelOutcome {
            challenger: self.challenger,
            defender: self.defender,
            animal: self.animal,
            winner,
            challenger_bid: challenger.notes.clone(),
            defender_bid: defender.notes.clone(),
        })
    }

    /// Swap the committed stacks through the ledger.
    ///
    /// Both stacks are re-validated by the ledger before anything moves. The
    /// returned outcome tells the caller whether the card moves.
    pub fn settle(&mut self, ledger: &mut Ledger) -> Result<Option<DuelOutcome>, LedgerError> {
        let Some(outcome) = self.reveal() else {
            return Ok(None);
        };
        ledger.exchange(
            outcome.challenger,
            &outcome.challenger_bid,
            outcome.defender,
            &outcome.defender_bid,
        )?;
        self.settled = true;
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    fn ledger() -> Ledger {
        Ledger::deal(3, &[0, 10, 50, 100], &Notes::from_counts([(0, 2), (10, 4), (50, 1)]))
    }

    #[test]
    fn test_commit_order_does_not_matter() {
        let ledger = ledger();
        let mut a = DuelEngine::start(p(0), p(1), AnimalType::Cow, TieBreak::DefenderWins);
        let mut b = a.clone();

        let c_stack = DuelStack::new(Notes::from_counts([(50, 1)]));
        let d_stack = DuelStack::new(Notes::from_counts([(10, 2)]));

        assert_eq!(a.commit(p(0), c_stack.clone(), &ledger).unwrap(), DuelPhase::AwaitingDefenderBid);
        assert_eq!(a.commit(p(1), d_stack.clone(), &ledger).unwrap(), DuelPhase::Revealed);

        assert_eq!(b.commit(p(1), d_stack, &ledger).unwrap(), DuelPhase::AwaitingChallengerBid);
        assert_eq!(b.commit(p(0), c_stack, &ledger).unwrap(), DuelPhase::Revealed);

        assert_eq!(a.reveal(), b.reveal());
        assert_eq!(a.reveal().unwrap().winner, p(0));
    }

    #[test]
    fn test_rejected_commits() {
        let ledger = ledger();
        let mut duel = DuelEngine::start(p(0), p(1), AnimalType::Cow, TieBreak::DefenderWins);

        assert_eq!(
            duel.commit(p(2), DuelStack::default(), &ledger),
            Err(IllegalAction::NotInDuel(p(2)))
        );
        assert_eq!(
            duel.commit(p(0), DuelStack::with_top(Notes::from_counts([(10, 1)]), 50), &ledger),
            Err(IllegalAction::TopNoteNotInStack(50))
        );
        assert!(matches!(
            duel.commit(p(0), DuelStack::new(Notes::from_counts([(50, 2)])), &ledger),
            Err(IllegalAction::InsufficientFunds(_))
        ));

        duel.commit(p(0), DuelStack::default(), &ledger).unwrap();
        assert_eq!(
            duel.commit(p(0), DuelStack::default(), &ledger),
            Err(IllegalAction::AlreadyCommitted(p(0)))
        );
        assert_eq!(duel.pending().as_slice(), &[p(1)]);
    }

    #[test]
    fn test_visible_stack_hides_value() {
        let ledger = ledger();
        let mut duel = DuelEngine::start(p(0), p(1), AnimalType::Cow, TieBreak::DefenderWins);
        let stack = DuelStack::with_top(Notes::from_counts([(0, 2), (50, 1)]), 0);
        duel.commit(p(0), stack, &ledger).unwrap();

        assert_eq!(duel.visible_stack(p(0)), Some((3, Some(0))));
        assert_eq!(duel.visible_stack(p(1)), None);
        assert!(duel.reveal().is_none());
    }

    #[test]
    fn test_settle_swaps_stacks() {
        let mut ledger = ledger();
        let mut duel = DuelEngine::start(p(0), p(1), AnimalType::Cow, TieBreak::DefenderWins);
        duel.commit(p(0), DuelStack::new(Notes::from_counts([(50, 1), (10, 1)])), &ledger).unwrap();
        duel.commit(p(1), DuelStack::new(Notes::from_counts([(10, 4)])), &ledger).unwrap();

        let outcome = duel.settle(&mut ledger).unwrap().unwrap();
        assert_eq!(outcome.winner, p(0));
        assert!(outcome.card_moves());
        assert_eq!(duel.phase(), DuelPhase::Settled);

        // 90 - 60 + 40 and 90 - 40 + 60
        assert_eq!(ledger.total_value(p(0)), 70);
        assert_eq!(ledger.total_value(p(1)), 110);
        assert!(ledger.check_conservation().is_ok());
    }

    #[test]
    fn test_tie_keeps_card_with_defender() {
        let ledger = ledger();
        let mut duel = DuelEngine::start(p(0), p(1), AnimalType::Cow, TieBreak::DefenderWins);
        duel.commit(p(0), DuelStack::new(Notes::from_counts([(10, 1)])), &ledger).unwrap();
        duel.commit(p(1), DuelStack::new(Notes::from_counts([(10, 1)])), &ledger).unwrap();
        let outcome = duel.reveal().unwrap();
        assert_eq!(outcome.winner, p(1));
        assert!(!outcome.card_moves());
        assert_eq!(outcome.loser(), p(0));
    }
}
