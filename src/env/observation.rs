//! Per-player observations and the legal-action mask.
//!
//! An [`Observation`] is a pure projection of the authoritative state. It
//! carries exact information only about the observer's own money; for every
//! other seat it exposes what sits on the table: herds, completed quartets and
//! the number of notes held. During a duel only each committed stack's size
//! and top note are visible.

use serde::{Deserialize, Serialize};

use crate::cards::{AnimalCard, AnimalType, HerdCounts};
use crate::core::{Action, GameState, PhaseKind, PlayerId, PlayerMap, MAX_PLAYERS};
use crate::duel::DuelRole;
use crate::ledger::Notes;
use crate::rules::RulesEngine;

/// Public view of the running auction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionView {
    pub card: AnimalCard,
    pub drawer: PlayerId,
    pub high_bid: u32,
    pub leader: Option<PlayerId>,
    pub active: Vec<PlayerId>,
    pub to_act: Option<PlayerId>,
}

/// What others see of a committed duel stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackView {
    pub note_count: u32,
    pub top: Option<u32>,
}

/// Public view of the running duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelView {
    pub challenger: PlayerId,
    pub defender: PlayerId,
    pub animal: AnimalType,
    /// The observer's side, if it takes part.
    pub role: Option<DuelRole>,
    pub challenger_stack: Option<StackView>,
    pub defender_stack: Option<StackView>,
}

/// Legal actions for one seat, in a fixed layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActionMask {
    pub pass: bool,
    pub draw: bool,
    /// `raises[k]`: raise to `high_bid + increment * (k + 1)`.
    pub raises: Vec<bool>,
    /// `challenges[defender * AnimalType::COUNT + animal]`.
    pub challenges: Vec<bool>,
    /// Upper bound per denomination for a duel bid, when one is owed.
    pub duel_bid: Option<Notes>,
}

impl LegalActionMask {
    /// Mask for `player`, built from the rules' own legality checks.
    pub fn build<E: RulesEngine>(
        engine: &E,
        state: &GameState,
        player: PlayerId,
        raise_steps: usize,
    ) -> Self {
        let mut mask = Self {
            raises: vec![false; raise_steps],
            challenges: vec![false; MAX_PLAYERS * AnimalType::COUNT],
            ..Self::default()
        };
        if !engine.acting_players(state).contains(&player) {
            return mask;
        }
        if state.phase().duel().is_some() {
            // Any sub-multiset of the bidder's notes is a legal stack.
            mask.duel_bid = Some(state.ledger().balance(player).clone());
            return mask;
        }

        let increment = engine.config().bid_increment.max(1);
        let high_bid = state.phase().auction().map_or(0, |a| a.high_bid());
        for action in engine.legal_actions(state, player) {
            match action {
                Action::Pass => mask.pass = true,
                Action::Draw => mask.draw = true,
                Action::Raise { amount } => {
                    let step = (amount.saturating_sub(high_bid) / increment) as usize;
                    if let Some(slot) = step.checked_sub(1).and_then(|k| mask.raises.get_mut(k)) {
                        *slot = true;
                    }
                }
                Action::Challenge { defender, animal } => {
                    if let Some(slot) = mask.challenges.get_mut(challenge_index(defender, animal)) {
                        *slot = true;
                    }
                }
                Action::SubmitDuelBid(_) => {}
            }
        }
        mask
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.pass
            || self.draw
            || self.duel_bid.is_some()
            || self.raises.iter().any(|&r| r)
            || self.challenges.iter().any(|&c| c)
    }
}

/// Flat slot of a challenge in [`LegalActionMask::challenges`].
#[must_use]
pub fn challenge_index(defender: PlayerId, animal: AnimalType) -> usize {
    defender.index() * AnimalType::COUNT + animal.index()
}

/// One seat's view of the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub player: PlayerId,
    pub player_count: usize,
    pub phase: PhaseKind,
    pub turn: u32,
    pub drawer: PlayerId,
    pub deck_remaining: usize,
    /// Exact notes of the observer.
    pub own_notes: Notes,
    pub herds: PlayerMap<HerdCounts>,
    pub quartets: PlayerMap<Vec<AnimalType>>,
    /// Number of notes every seat holds (values stay hidden).
    pub note_counts: PlayerMap<u32>,
    pub auction: Option<AuctionView>,
    pub duel: Option<DuelView>,
    pub legal: LegalActionMask,
}

impl Observation {
    /// Project `state` for `player`. Never mutates anything.
    pub fn project<E: RulesEngine>(
        engine: &E,
        state: &GameState,
        player: PlayerId,
        raise_steps: usize,
    ) -> Self {
        let ledger = state.ledger();
        let own_notes = if player.index() < ledger.player_count() {
            ledger.balance(player).clone()
        } else {
            Notes::new()
        };

        let auction = state.phase().auction().map(|a| AuctionView {
            card: a.card(),
            drawer: a.drawer(),
            high_bid: a.high_bid(),
            leader: a.leader(),
            active: a.active_bidders().to_vec(),
            to_act: a.to_act(),
        });

        let duel = state.phase().duel().map(|d| {
            let view = |p: PlayerId| {
                d.visible_stack(p)
                    .map(|(note_count, top)| StackView { note_count, top })
            };
            DuelView {
                challenger: d.challenger(),
                defender: d.defender(),
                animal: d.animal(),
                role: d.role_of(player),
                challenger_stack: view(d.challenger()),
                defender_stack: view(d.defender()),
            }
        });

        Self {
            player,
            player_count: state.player_count(),
            phase: state.phase_kind(),
            turn: state.turn(),
            drawer: state.drawer(),
            deck_remaining: state.deck().remaining(),
            own_notes,
            herds: state.herds().map(|_, h| h.counts()),
            quartets: state.herds().map(|_, h| h.completed_quartets().to_vec()),
            note_counts: PlayerMap::new(state.player_count(), |p| ledger.note_count(p)),
            auction,
            duel,
            legal: LegalActionMask::build(engine, state, player, raise_steps),
        }
    }

    #[must_use]
    pub fn own_money(&self) -> u64 {
        self.own_notes.total_value()
    }

    /// Whether the observer is expected to act.
    #[must_use]
    pub fn is_acting(&self) -> bool {
        self.legal.any()
    }
}

/// Flat discrete action space over the mask (duel bids are structured and
/// handled separately).
///
/// Layout: `[pass, draw, raise_1 .. raise_n, challenge_0 .. challenge_m]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    pub raise_steps: usize,
    pub bid_increment: u32,
}

impl ActionSpace {
    const PASS: usize = 0;
    const DRAW: usize = 1;
    const RAISES: usize = 2;

    #[must_use]
    pub fn new(raise_steps: usize, bid_increment: u32) -> Self {
        Self {
            raise_steps,
            bid_increment,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        Self::RAISES + self.raise_steps + MAX_PLAYERS * AnimalType::COUNT
    }

    /// The mask as one boolean per flat index.
    #[must_use]
    pub fn flatten(&self, mask: &LegalActionMask) -> Vec<bool> {
        let mut flat = Vec::with_capacity(self.size());
        flat.push(mask.pass);
        flat.push(mask.draw);
        flat.extend((0..self.raise_steps).map(|k| mask.raises.get(k).copied().unwrap_or(false)));
        flat.extend(
            (0..MAX_PLAYERS * AnimalType::COUNT)
                .map(|i| mask.challenges.get(i).copied().unwrap_or(false)),
        );
        flat
    }

    /// Turn a flat index into an action in the context of `observation`.
    #[must_use]
    pub fn decode(&self, index: usize, observation: &Observation) -> Option<Action> {
        let challenges = Self::RAISES + self.raise_steps;
        match index {
            Self::PASS => Some(Action::Pass),
            Self::DRAW => Some(Action::Draw),
            i if i < challenges => {
                let high_bid = observation.auction.as_ref()?.high_bid;
                let step = u32::try_from(i - Self::RAISES + 1).ok()?;
                Some(Action::Raise {
                    amount: high_bid + self.bid_increment * step,
                })
            }
            i if i < self.size() => {
                let slot = i - challenges;
                let defender = PlayerId::new(u8::try_from(slot / AnimalType::COUNT).ok()?);
                let animal = AnimalType::from_index(slot % AnimalType::COUNT)?;
                Some(Action::Challenge { defender, animal })
            }
            _ => None,
        }
    }

    /// Flat index of a discrete action, if it has one.
    #[must_use]
    pub fn index_of(&self, action: &Action, observation: &Observation) -> Option<usize> {
        match action {
            Action::Pass => Some(Self::PASS),
            Action::Draw => Some(Self::DRAW),
            Action::Raise { amount } => {
                let high_bid = observation.auction.as_ref()?.high_bid;
                let over = amount.checked_sub(high_bid)?;
                if self.bid_increment == 0 || over == 0 || over % self.bid_increment != 0 {
                    return None;
                }
                let k = (over / self.bid_increment) as usize - 1;
                (k < self.raise_steps).then_some(Self::RAISES + k)
            }
            Action::Challenge { defender, animal } => {
                Some(Self::RAISES + self.raise_steps + challenge_index(*defender, *animal))
                    .filter(|&i| i < self.size())
            }
            Action::SubmitDuelBid(_) => None,
        }
    }
}
