//! Agents and the episode rollout helper.

use serde::{Deserialize, Serialize};

use super::adapter::EnvironmentAdapter;
use super::observation::Observation;
use crate::core::{Action, GameError, GameRng, PlayerId, PlayerMap};
use crate::rules::GameResult;

/// Anything that picks an action from an observation.
pub trait Agent {
    /// Choose one of `legal`. Returning `None` stops the episode.
    fn act(&mut self, observation: &Observation, legal: &[Action]) -> Option<Action>;
}

/// Uniform random agent (baseline for testing and benchmarks).
///
/// Seeded, so a rollout with fixed seeds is reproducible.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: GameRng,
    pass_probability: f64,
}

impl RandomAgent {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            pass_probability: 0.0,
        }
    }

    /// Pass with this probability whenever passing is legal, before falling
    /// back to a uniform choice. Shortens auctions in rollouts.
    #[must_use]
    pub fn with_pass_probability(mut self, probability: f64) -> Self {
        self.pass_probability = probability.clamp(0.0, 1.0);
        self
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _observation: &Observation, legal: &[Action]) -> Option<Action> {
        if self.pass_probability > 0.0
            && legal.contains(&Action::Pass)
            && self.rng.gen_bool(self.pass_probability)
        {
            return Some(Action::Pass);
        }
        self.rng.choose(legal).cloned()
    }
}

/// What a finished (or truncated) rollout produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub illegal_actions: usize,
    /// Sum of money deltas per seat.
    pub returns: PlayerMap<i64>,
    pub terminal: bool,
    pub scores: PlayerMap<u64>,
}

impl EpisodeSummary {
    /// Final ranking, if the match ended.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.terminal.then(|| GameResult::from_scores(&self.scores))
    }
}

/// Play until the match ends, an agent gives up, or `max_steps` is reached.
///
/// `agents` holds one agent per seat, indexed by seat.
pub fn play_episode(
    env: &mut EnvironmentAdapter,
    agents: &mut [Box<dyn Agent>],
    max_steps: usize,
) -> Result<EpisodeSummary, GameError> {
    let mut returns = PlayerMap::with_value(env.player_count(), 0i64);
    let mut steps = 0;
    let mut illegal_actions = 0;

    while steps < max_steps {
        let Some(player) = env.current_player() else {
            break;
        };
        let Some(agent) = agents.get_mut(player.index()) else {
            break;
        };
        let observation = env.observe(player);
        let legal = env.legal_actions(player);
        let Some(action) = agent.act(&observation, &legal) else {
            break;
        };

        let result = env.step_as(player, action)?;
        for (p, delta) in result.rewards.iter() {
            returns[p] += *delta;
        }
        illegal_actions += usize::from(result.info.illegal);
        steps += 1;
        if result.terminal {
            break;
        }
    }

    Ok(EpisodeSummary {
        steps,
        illegal_actions,
        returns,
        terminal: env.is_terminal(),
        scores: env.state().scores(),
    })
}

/// One seeded [`RandomAgent`] per seat.
#[must_use]
pub fn random_agents(player_count: usize, seed: u64) -> Vec<Box<dyn Agent>> {
    PlayerId::all(player_count)
        .map(|p| {
            Box::new(RandomAgent::new(seed.wrapping_add(p.index() as u64)).with_pass_probability(0.3))
                as Box<dyn Agent>
        })
        .collect()
}
