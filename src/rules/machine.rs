//! The game state machine.
//!
//! Owns the turn order and the transition table between phases; the money
//! and the bidding logic live in the ledger and the two sub-engines.
//!
//! Every action goes through the same pipeline:
//! 1. `validate` against the current state (no mutation)
//! 2. execute on a clone, collecting events
//! 3. check the structural invariants on the clone
//! 4. commit the clone
//!
//! An invariant failure aborts the match instead of committing.

use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use super::engine::{GameResult, RulesEngine};
use crate::auction::{AuctionEngine, AuctionResult, AuctionStatus};
use crate::cards::{AnimalCard, AnimalType, Deck, QuartetRecord, CARDS_PER_ANIMAL};
use crate::core::{
    Action, ConfigError, GameError, GameEvent, GameRng, GameState, IllegalAction,
    IllegalBidPolicy, Phase, PlayerId, RulesConfig, TurnStructure,
};
use crate::duel::{DuelEngine, DuelPhase, DuelStack};
use crate::ledger::{Holder, Ledger, Notes};

/// Kuhhandel rules for 3 to 5 seats.
#[derive(Clone, Debug)]
pub struct GameStateMachine {
    config: RulesConfig,
}

impl GameStateMachine {
    /// Create a machine for a validated rule set.
    pub fn new(config: RulesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Deal, shuffle with the seeded RNG, and start the first turn.
    pub fn new_game(&self, seed: u64) -> Result<GameState, GameError> {
        let mut rng = GameRng::new(seed).for_context("deck");
        let mut deck = Deck::new(&self.config.animals);
        deck.shuffle(&mut rng);
        self.new_game_with_deck(seed, deck)
    }

    /// Start a match with a pre-arranged deck (front is drawn first).
    pub fn new_game_with_deck(&self, seed: u64, deck: Deck) -> Result<GameState, GameError> {
        let ledger = Ledger::deal(
            self.config.num_players,
            &self.config.denominations,
            &self.config.starting_notes,
        );
        let mut state = GameState::new(seed, ledger, deck);
        let mut events = Vec::new();
        self.begin_turn(&mut state, &mut events)?;
        info!(
            seed,
            players = self.config.num_players,
            cards = state.deck().remaining(),
            "new game"
        );
        Ok(state)
    }

    /// `(defender, animal)` pairs `challenger` could duel over right now.
    #[must_use]
    pub fn eligible_challenges(
        &self,
        state: &GameState,
        challenger: PlayerId,
    ) -> Vec<(PlayerId, AnimalType)> {
        if !self.config.duel_enabled {
            return Vec::new();
        }
        let Some(own) = state.herds().get(challenger) else {
            return Vec::new();
        };
        challenger
            .others_in_turn_order(state.player_count())
            .flat_map(move |defender| {
                let theirs = &state.herds()[defender];
                own.owned_types()
                    .filter(move |&animal| theirs.owns(animal))
                    .map(move |animal| (defender, animal))
            })
            .collect()
    }

    // === Validation ===

    fn check_drawer(state: &GameState, player: PlayerId) -> Result<(), IllegalAction> {
        if player == state.drawer() {
            Ok(())
        } else {
            Err(IllegalAction::NotYourTurn(player))
        }
    }

    fn check_challenge(
        &self,
        state: &GameState,
        challenger: PlayerId,
        defender: PlayerId,
        animal: AnimalType,
    ) -> Result<(), IllegalAction> {
        if !self.config.duel_enabled {
            return Err(IllegalAction::DuelsDisabled);
        }
        Self::check_drawer(state, challenger)?;
        let ineligible = IllegalAction::IneligibleChallenge { defender, animal };
        let Some(theirs) = state.herds().get(defender) else {
            return Err(ineligible);
        };
        if defender == challenger || !theirs.owns(animal) || !state.herd(challenger).owns(animal) {
            return Err(ineligible);
        }
        Ok(())
    }

    // === Transitions ===

    /// Enter the next turn: terminal if the deck is empty, otherwise draw or
    /// wait for the drawer's choice.
    fn begin_turn(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        if state.deck.is_empty() {
            state.phase = Phase::Terminal;
            let scores = state.scores();
            info!(turn = state.turn, ?scores, "game over");
            events.push(GameEvent::GameOver { scores });
            return Ok(());
        }

        let wait_for_choice = self.config.turn_structure == TurnStructure::DuelInsteadOfAuction
            && !self.eligible_challenges(state, state.drawer).is_empty();
        if wait_for_choice {
            state.phase = Phase::TurnStart;
            Ok(())
        } else {
            self.draw_card(state, events)
        }
    }

    fn draw_card(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let card = state
            .deck
            .draw()
            .ok_or_else(|| GameError::InvariantViolation("draw from an empty deck".into()))?;
        let drawer = state.drawer;
        let floor = u64::from(self.config.auction_floor).min(state.ledger.total_value(drawer));
        let floor = u32::try_from(floor).unwrap_or(self.config.auction_floor);
        state.phase = Phase::Auctioning(AuctionEngine::open(
            card,
            drawer,
            state.player_count(),
            floor,
        ));
        debug!(%drawer, %card, "card drawn");
        events.push(GameEvent::CardDrawn { drawer, card });
        Ok(())
    }

    fn execute(
        &self,
        state: &mut GameState,
        player: PlayerId,
        action: &Action,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        match action {
            Action::Draw => self.draw_card(state, events),
            Action::Challenge { defender, animal } => {
                self.start_duel(state, player, *defender, *animal, events);
                Ok(())
            }
            Action::Pass if matches!(state.phase, Phase::DuelOffer) => {
                events.push(GameEvent::DuelDeclined { player });
                self.end_turn(state, events)
            }
            Action::Pass => {
                let status = match &mut state.phase {
                    Phase::Auctioning(auction) => auction.pass(player)?,
                    phase => return Err(IllegalAction::WrongPhase(phase.kind()).into()),
                };
                events.push(GameEvent::BidderPassed { player });
                self.after_auction_step(state, status, events)
            }
            Action::Raise { amount } => {
                let available = state.ledger.total_value(player);
                let increment = self.config.bid_increment;
                let status = match &mut state.phase {
                    Phase::Auctioning(auction) => auction.raise(player, *amount, increment, available)?,
                    phase => return Err(IllegalAction::WrongPhase(phase.kind()).into()),
                };
                events.push(GameEvent::BidRaised {
                    player,
                    amount: *amount,
                });
                self.after_auction_step(state, status, events)
            }
            Action::SubmitDuelBid(stack) => self.commit_duel_bid(state, player, stack, events),
        }
    }

    fn after_auction_step(
        &self,
        state: &mut GameState,
        status: AuctionStatus,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        match status {
            AuctionStatus::Open { .. } => Ok(()),
            AuctionStatus::Closed(result) => self.settle_auction(state, result, events),
        }
    }

    fn settle_auction(
        &self,
        state: &mut GameState,
        result: AuctionResult,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let payment = result
            .settle(&mut state.ledger, self.config.give_change)
            .map_err(|e| GameError::InvariantViolation(format!("auction payment failed: {e}")))?;

        info!(
            winner = %result.winner,
            card = %result.card,
            price = result.price,
            self_bought = result.self_bought,
            "auction settled"
        );
        if result.self_bought {
            events.push(GameEvent::SelfBought {
                drawer: result.drawer,
                card: result.card,
                price: result.price,
            });
        } else {
            events.push(GameEvent::AuctionWon {
                winner: result.winner,
                drawer: result.drawer,
                card: result.card,
                price: result.price,
                paid: payment.paid,
                change: payment.change,
            });
        }

        self.add_to_herd(state, result.winner, result.card, events)?;

        let offer_duel = self.config.turn_structure == TurnStructure::DuelAfterAuction
            && !self.eligible_challenges(state, state.drawer).is_empty();
        if offer_duel {
            state.phase = Phase::DuelOffer;
            Ok(())
        } else {
            self.end_turn(state, events)
        }
    }

    fn start_duel(
        &self,
        state: &mut GameState,
        challenger: PlayerId,
        defender: PlayerId,
        animal: AnimalType,
        events: &mut Vec<GameEvent>,
    ) {
        info!(%challenger, %defender, %animal, "duel started");
        state.phase = Phase::Dueling(DuelEngine::start(
            challenger,
            defender,
            animal,
            self.config.tie_break,
        ));
        events.push(GameEvent::DuelStarted {
            challenger,
            defender,
            animal,
        });
    }

    fn commit_duel_bid(
        &self,
        state: &mut GameState,
        player: PlayerId,
        stack: &DuelStack,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let phase = match &mut state.phase {
            Phase::Dueling(duel) => duel.commit(player, stack.clone(), &state.ledger)?,
            phase => return Err(IllegalAction::WrongPhase(phase.kind()).into()),
        };
        events.push(GameEvent::DuelBidCommitted {
            player,
            note_count: stack.note_count(),
            top: stack.visible_top(),
        });
        if phase == DuelPhase::Revealed {
            self.settle_duel(state, events)?;
        }
        Ok(())
    }

    fn settle_duel(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let outcome = match &mut state.phase {
            Phase::Dueling(duel) => duel
                .settle(&mut state.ledger)
                .map_err(|e| GameError::InvariantViolation(format!("duel settlement failed: {e}")))?,
            _ => None,
        }
        .ok_or_else(|| GameError::InvariantViolation("settling a duel that is not revealed".into()))?;

        info!(
            challenger = %outcome.challenger,
            defender = %outcome.defender,
            challenger_value = outcome.challenger_value(),
            defender_value = outcome.defender_value(),
            winner = %outcome.winner,
            "duel revealed"
        );
        events.push(GameEvent::DuelRevealed {
            challenger_bid: outcome.challenger_bid.clone(),
            defender_bid: outcome.defender_bid.clone(),
            winner: outcome.winner,
        });

        if outcome.card_moves() {
            let card = state.herds[outcome.defender]
                .remove_one(outcome.animal)
                .ok_or_else(|| {
                    GameError::InvariantViolation(format!(
                        "{} lost its {} before the duel settled",
                        outcome.defender, outcome.animal
                    ))
                })?;
            events.push(GameEvent::CardTransferred {
                from: outcome.defender,
                to: outcome.challenger,
                card,
            });
            self.add_to_herd(state, outcome.challenger, card, events)?;
        }
        self.end_turn(state, events)
    }

    /// Put a card in a herd and pay out a completed quartet.
    fn add_to_herd(
        &self,
        state: &mut GameState,
        player: PlayerId,
        card: AnimalCard,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if state.herds[player].add(card) < CARDS_PER_ANIMAL {
            return Ok(());
        }

        let animal = card.animal;
        let cards = state.herds[player].take_quartet(animal).ok_or_else(|| {
            GameError::InvariantViolation(format!("{player} has more than four {animal} cards"))
        })?;
        let payout = self.config.quartet_value(animal);
        state
            .ledger
            .pay(Holder::Bank, Holder::Player(player), u64::from(payout), false)
            .map_err(|e| GameError::InvariantViolation(format!("quartet payout failed: {e}")))?;
        state.deck.record_quartet(QuartetRecord {
            owner: player,
            animal,
            payout,
            cards,
        });
        info!(%player, %animal, payout, "quartet completed");
        events.push(GameEvent::QuartetCompleted {
            player,
            animal,
            payout,
        });
        Ok(())
    }

    fn end_turn(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        state.drawer = state.drawer.next(state.player_count());
        state.turn += 1;
        events.push(GameEvent::TurnEnded {
            next_drawer: state.drawer,
            turn: state.turn,
        });
        self.begin_turn(state, events)
    }

    /// Under `ForfeitToPass`, the events of treating a rejected raise as a pass.
    fn forfeit(
        &self,
        state: &mut GameState,
        player: PlayerId,
        action: &Action,
        reason: &IllegalAction,
    ) -> Option<Result<Vec<GameEvent>, GameError>> {
        let forfeitable = self.config.illegal_bid_policy == IllegalBidPolicy::ForfeitToPass
            && matches!(action, Action::Raise { .. })
            && state.phase().auction().and_then(AuctionEngine::to_act) == Some(player);
        if !forfeitable {
            return None;
        }
        warn!(%player, %action, %reason, "illegal raise forfeited as a pass");
        let mut events = vec![GameEvent::BidForfeited {
            player,
            reason: reason.clone(),
        }];
        Some(self.commit(state, player, &Action::Pass, &mut events).map(|()| events))
    }

    /// Execute on a clone, check invariants, commit.
    fn commit(
        &self,
        state: &mut GameState,
        player: PlayerId,
        action: &Action,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let mut next = state.clone();
        next.record(player, action.clone());

        match self.execute(&mut next, player, action, events) {
            Ok(()) => {}
            Err(GameError::InvariantViolation(reason)) => return Err(self.abort(state, reason)),
            Err(other) => return Err(other),
        }
        if let Err(reason) = next.check_invariants() {
            return Err(self.abort(state, reason));
        }

        debug!(%player, %action, turn = next.turn, phase = ?next.phase_kind(), "action applied");
        *state = next;
        Ok(())
    }

    fn abort(&self, state: &mut GameState, reason: String) -> GameError {
        error!(turn = state.turn, %reason, "invariant violated; aborting match");
        state.phase = Phase::Aborted {
            reason: reason.clone(),
        };
        GameError::InvariantViolation(reason)
    }

    // === Enumeration ===

    fn raise_actions(&self, state: &GameState, auction: &AuctionEngine, player: PlayerId) -> Vec<Action> {
        let increment = u64::from(self.config.bid_increment.max(1));
        let available = state.ledger.total_value(player);
        let first = (u64::from(auction.high_bid()) / increment + 1) * increment;
        (0..)
            .map(|k| first + k * increment)
            .take_while(|&amount| amount <= available)
            .filter_map(|amount| u32::try_from(amount).ok())
            .map(|amount| Action::Raise { amount })
            .collect()
    }

    /// One bid per reachable stack value, padded with every possible number of
    /// zero notes (they change the visible stack size, not its value).
    fn duel_bid_actions(holdings: &Notes) -> Vec<Action> {
        let zeros = holdings.count(0);
        holdings
            .combinations()
            .into_values()
            .flat_map(|combo| {
                (0..=zeros).map(move |padding| {
                    let mut notes = combo.clone();
                    notes.add(0, padding);
                    Action::duel_bid(notes)
                })
            })
            .collect()
    }
}

impl RulesEngine for GameStateMachine {
    fn config(&self) -> &RulesConfig {
        &self.config
    }

    fn acting_players(&self, state: &GameState) -> SmallVec<[PlayerId; 2]> {
        match state.phase() {
            Phase::TurnStart | Phase::DuelOffer => SmallVec::from_slice(&[state.drawer()]),
            Phase::Auctioning(auction) => auction.to_act().into_iter().collect(),
            Phase::Dueling(duel) => duel.pending(),
            Phase::Setup | Phase::Terminal | Phase::Aborted { .. } => SmallVec::new(),
        }
    }

    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        if !self.acting_players(state).contains(&player) {
            return Vec::new();
        }
        let challenges = || {
            self.eligible_challenges(state, player)
                .into_iter()
                .map(|(defender, animal)| Action::Challenge { defender, animal })
        };
        match state.phase() {
            Phase::TurnStart => std::iter::once(Action::Draw).chain(challenges()).collect(),
            Phase::DuelOffer => std::iter::once(Action::Pass).chain(challenges()).collect(),
            Phase::Auctioning(auction) => {
                let mut actions = vec![Action::Pass];
                actions.extend(self.raise_actions(state, auction, player));
                actions
            }
            Phase::Dueling(_) => Self::duel_bid_actions(state.ledger().balance(player)),
            Phase::Setup | Phase::Terminal | Phase::Aborted { .. } => Vec::new(),
        }
    }

    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), IllegalAction> {
        if state.is_over() {
            return Err(IllegalAction::GameOver);
        }
        if !state.herds().contains(player) {
            return Err(IllegalAction::UnknownPlayer(player));
        }
        if matches!(action, Action::Challenge { .. }) && !self.config.duel_enabled {
            return Err(IllegalAction::DuelsDisabled);
        }
        match (state.phase(), action) {
            (Phase::TurnStart, Action::Draw) => Self::check_drawer(state, player),
            (Phase::TurnStart | Phase::DuelOffer, Action::Challenge { defender, animal }) => {
                self.check_challenge(state, player, *defender, *animal)
            }
            (Phase::DuelOffer, Action::Pass) => Self::check_drawer(state, player),
            (Phase::Auctioning(auction), Action::Raise { amount }) => auction.check_raise(
                player,
                *amount,
                self.config.bid_increment,
                state.ledger().total_value(player),
            ),
            (Phase::Auctioning(auction), Action::Pass) => auction.check_pass(player),
            (Phase::Dueling(duel), Action::SubmitDuelBid(stack)) => {
                duel.check_commit(player, stack, state.ledger())
            }
            (phase, _) => Err(IllegalAction::WrongPhase(phase.kind())),
        }
    }

    fn apply_action(
        &self,
        state: &mut GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<Vec<GameEvent>, GameError> {
        if let Err(reason) = self.validate(state, player, action) {
            if let Some(forfeited) = self.forfeit(state, player, action, &reason) {
                return forfeited;
            }
            warn!(%player, %action, %reason, "action rejected");
            return Err(reason.into());
        }

        let mut events = Vec::new();
        self.commit(state, player, action, &mut events)?;
        Ok(events)
    }

    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        match state.phase() {
            Phase::Terminal => Some(GameResult::from_scores(&state.scores())),
            Phase::Aborted { reason } => Some(GameResult::Aborted(reason.clone())),
            _ => None,
        }
    }
}
