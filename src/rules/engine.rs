//! Rules engine trait.
//!
//! The environment layer and the rollout helpers only talk to the rules
//! through this trait:
//! - What actions are legal, and who may act
//! - How actions modify state
//! - When the match is over and who won

use smallvec::SmallVec;

use crate::core::{
    Action, GameError, GameEvent, GameState, IllegalAction, PlayerId, PlayerMap, RulesConfig,
};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (every seat tied).
    Draw,
    /// Several seats share the top score.
    Winners(Vec<PlayerId>),
    /// The match was stopped on an inconsistent state.
    Aborted(String),
}

impl GameResult {
    /// Rank seats by final score.
    #[must_use]
    pub fn from_scores(scores: &PlayerMap<u64>) -> Self {
        let Some(best) = scores.values().copied().max() else {
            return GameResult::Draw;
        };
        let top: Vec<PlayerId> = scores
            .iter()
            .filter(|(_, score)| **score == best)
            .map(|(p, _)| p)
            .collect();
        match top.as_slice() {
            [winner] => GameResult::Winner(*winner),
            _ if top.len() == scores.player_count() => GameResult::Draw,
            _ => GameResult::Winners(top),
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw | GameResult::Aborted(_) => false,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `acting_players`: empty once the match is over; two entries while both
///   duel bids are outstanding
/// - `validate`: must not mutate anything
/// - `apply_action`: deterministic; leaves `state` untouched when it returns
///   an illegal-action error
/// - `is_terminal`: return `None` if the game continues
pub trait RulesEngine {
    /// Get the rule set.
    fn config(&self) -> &RulesConfig;

    /// Seats that may act right now.
    fn acting_players(&self, state: &GameState) -> SmallVec<[PlayerId; 2]>;

    /// Enumerate all legal actions for a player.
    ///
    /// Returns empty if the player has no legal actions.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action>;

    /// Check an action against the rules without applying it.
    fn validate(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), IllegalAction>;

    /// Apply an action to the game state.
    fn apply_action(
        &self,
        state: &mut GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<Vec<GameEvent>, GameError>;

    /// Check if the game is over.
    ///
    /// Returns `Some(result)` if the game has ended, `None` if it continues.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult>;

    // === Convenience Methods ===

    /// Whether `action` would be accepted.
    fn is_legal(&self, state: &GameState, player: PlayerId, action: &Action) -> bool {
        self.validate(state, player, action).is_ok()
    }
}
