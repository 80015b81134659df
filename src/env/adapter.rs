//! Reinforcement-learning environment over the state machine.
//!
//! The adapter owns one match. Rejected actions are reported in
//! [`StepInfo`] instead of as errors, so a learning loop can penalize them
//! and carry on; only a step after the match ended or a broken invariant
//! produces an `Err`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::observation::{ActionSpace, LegalActionMask, Observation};
use crate::core::{
    Action, GameError, GameEvent, GameState, IllegalAction, PlayerId, PlayerMap, RulesConfig,
    Snapshot,
};
use crate::rules::{GameResult, GameStateMachine, RulesEngine};

/// Environment configuration: the rule set plus the action-space shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub rules: RulesConfig,
    /// Raise slots in the discrete action space.
    pub raise_steps: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            raise_steps: 20,
        }
    }
}

impl EnvConfig {
    #[must_use]
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_raise_steps(mut self, steps: usize) -> Self {
        self.raise_steps = steps;
        self
    }
}

/// Diagnostics for one step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub actor: Option<PlayerId>,
    /// The action broke the rules. The state is unchanged unless it was
    /// forfeited into a pass.
    pub illegal: bool,
    pub forfeited: bool,
    pub error: Option<IllegalAction>,
    pub events: Vec<GameEvent>,
    /// Final money per seat, once the match is over.
    pub scores: Option<PlayerMap<u64>>,
}

/// Result of [`EnvironmentAdapter::step`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// View of the next seat to act (the actor's view once the match is over).
    pub observation: Observation,
    /// Money change of the actor.
    pub reward: i64,
    /// Money change of every seat.
    pub rewards: PlayerMap<i64>,
    pub terminal: bool,
    pub info: StepInfo,
}

/// One match wrapped as an environment.
#[derive(Clone, Debug)]
pub struct EnvironmentAdapter {
    config: EnvConfig,
    machine: GameStateMachine,
    state: GameState,
}

impl EnvironmentAdapter {
    /// Create an environment and start the first match.
    pub fn new(seed: u64, config: EnvConfig) -> Result<Self, GameError> {
        let machine = GameStateMachine::new(config.rules.clone())?;
        let state = machine.new_game(seed)?;
        Ok(Self {
            config,
            machine,
            state,
        })
    }

    /// Start a fresh match; returns the first actor's observation.
    pub fn reset(&mut self, seed: u64, config: EnvConfig) -> Result<Observation, GameError> {
        *self = Self::new(seed, config)?;
        Ok(self.observe(self.current_player().unwrap_or(PlayerId::new(0))))
    }

    /// Wrap an existing state, e.g. one restored from a [`Snapshot`].
    pub fn from_snapshot(snapshot: Snapshot, raise_steps: usize) -> Result<Self, GameError> {
        let machine = GameStateMachine::new(snapshot.config.clone())?;
        Ok(Self {
            config: EnvConfig {
                rules: snapshot.config,
                raise_steps,
            },
            machine,
            state: snapshot.state,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    /// Read-only view of the authoritative state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.state.player_count()
    }

    #[must_use]
    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::new(self.config.raise_steps, self.config.rules.bid_increment)
    }

    /// The first seat that owes an action, if any.
    ///
    /// During a duel both participants may owe a bid; this returns the
    /// challenger first. Use [`Self::step_as`] to commit in any order.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.machine.acting_players(&self.state).first().copied()
    }

    /// Every seat that owes an action.
    #[must_use]
    pub fn acting_players(&self) -> Vec<PlayerId> {
        self.machine.acting_players(&self.state).into_vec()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_over()
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.machine.is_terminal(&self.state)
    }

    #[must_use]
    pub fn observe(&self, player: PlayerId) -> Observation {
        Observation::project(&self.machine, &self.state, player, self.config.raise_steps)
    }

    #[must_use]
    pub fn legal_action_mask(&self, player: PlayerId) -> LegalActionMask {
        LegalActionMask::build(&self.machine, &self.state, player, self.config.raise_steps)
    }

    #[must_use]
    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        self.machine.legal_actions(&self.state, player)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.config.rules.clone(), self.state.clone())
    }

    /// Act for [`Self::current_player`].
    pub fn step(&mut self, action: Action) -> Result<StepResult, GameError> {
        let player = self.current_player().ok_or(IllegalAction::GameOver)?;
        self.step_as(player, action)
    }

    /// Act for a specific seat.
    pub fn step_as(&mut self, player: PlayerId, action: Action) -> Result<StepResult, GameError> {
        if self.state.is_over() {
            return Err(IllegalAction::GameOver.into());
        }

        let before = self.state.scores();
        let mut info = StepInfo {
            actor: Some(player),
            ..StepInfo::default()
        };
        match self.machine.apply_action(&mut self.state, player, &action) {
            Ok(events) => {
                info.error = events.iter().find_map(|event| match event {
                    GameEvent::BidForfeited { reason, .. } => Some(reason.clone()),
                    _ => None,
                });
                info.forfeited = info.error.is_some();
                info.illegal = info.forfeited;
                info.events = events;
            }
            Err(GameError::Illegal(reason)) => {
                debug!(%player, %action, %reason, "illegal action reported to the agent");
                info.illegal = true;
                info.error = Some(reason);
            }
            Err(fatal) => return Err(fatal),
        }

        let after = self.state.scores();
        let rewards = PlayerMap::new(after.player_count(), |p| {
            i64::try_from(after[p]).unwrap_or(i64::MAX) - i64::try_from(before[p]).unwrap_or(i64::MAX)
        });
        let terminal = self.state.is_over();
        if terminal {
            info.scores = Some(after);
        }
        let viewer = self.current_player().unwrap_or(player);

        Ok(StepResult {
            observation: self.observe(viewer),
            reward: rewards.get(player).copied().unwrap_or(0),
            rewards,
            terminal,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvironmentAdapter {
        EnvironmentAdapter::new(17, EnvConfig::default()).unwrap()
    }

    #[test]
    fn test_reset_observation() {
        let mut env = env();
        let obs = env.reset(4, EnvConfig::default().with_raise_steps(6)).unwrap();
        assert_eq!(obs.player, PlayerId::new(1));
        assert_eq!(obs.legal.raises.len(), 6);
        assert_eq!(env.current_player(), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_illegal_step_is_reported() {
        let mut env = env();
        let before = env.snapshot();
        let result = env.step(Action::Raise { amount: 5 }).unwrap();
        assert!(result.info.illegal);
        assert!(!result.info.forfeited);
        assert_eq!(
            result.info.error,
            Some(IllegalAction::BidNotMultiple { amount: 5, increment: 10 })
        );
        assert_eq!(result.reward, 0);
        assert_eq!(env.snapshot(), before);
    }

    #[test]
    fn test_auction_rewards_are_money_deltas() {
        let mut env = env();
        env.step(Action::Raise { amount: 30 }).unwrap();
        let result = env.step(Action::Pass).unwrap();
        assert!(!result.info.illegal);
        // Bidder 1 paid the drawer at least 30.
        assert!(result.rewards[PlayerId::new(1)] <= -30);
        assert_eq!(
            result.rewards[PlayerId::new(0)],
            -result.rewards[PlayerId::new(1)]
        );
        assert_eq!(result.rewards[PlayerId::new(2)], 0);
        // Reward goes to the actor, who was seat 2.
        assert_eq!(result.reward, 0);
    }

    #[test]
    fn test_step_after_end_is_error() {
        let mut env = env();
        let mut steps = 0;
        while !env.is_terminal() && steps < 10_000 {
            env.step(Action::Pass).unwrap();
            steps += 1;
        }
        assert!(env.is_terminal());
        assert!(matches!(
            env.step(Action::Pass),
            Err(GameError::Illegal(IllegalAction::GameOver))
        ));
    }
}
