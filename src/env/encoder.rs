//! Observation encoding for neural network input.
//!
//! Encoders only ever see an [`Observation`], so they cannot leak what the
//! observer is not allowed to know.

use serde::{Deserialize, Serialize};

use super::observation::{ActionSpace, Observation, StackView};
use crate::cards::{AnimalType, CARDS_PER_ANIMAL};
use crate::core::{PhaseKind, PlayerId, MAX_PLAYERS};

/// Encoded observation as a flat tensor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor (e.g., `[features]`).
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Create a zero-filled encoded state with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    /// Get the total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// Check if the tensor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Get element at a flat index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }
}

/// Encodes observations into tensors.
///
/// Each encoder defines:
/// - How to convert an observation to a tensor
/// - The shape of the output tensor
/// - The size of the discrete action space
pub trait StateEncoder: Send + Sync {
    /// Encode one seat's observation.
    fn encode(&self, observation: &Observation) -> EncodedState;

    /// Get the shape of encoded states.
    fn output_shape(&self) -> Vec<usize>;

    /// Get the total number of discrete actions.
    fn action_space_size(&self) -> usize;
}

/// Flat feature encoder.
///
/// Layout, with every seat-indexed block sized for the largest table and
/// rotated so the observer is always seat 0:
/// - phase one-hot
/// - drawer one-hot, deck fraction remaining
/// - own note counts per denomination, own money
/// - per seat: present flag, herd counts, quartet count, note count
/// - auction: card kind one-hot, high bid, leader one-hot, active flags, to-act one-hot
/// - duel: kind one-hot, challenger one-hot, defender one-hot, per side committed flag, note count, top note
#[derive(Clone, Debug)]
pub struct ObservationEncoder {
    denominations: Vec<u32>,
    action_space: ActionSpace,
    money_scale: f32,
    note_scale: f32,
}

const SEAT_FEATURES: usize = 1 + AnimalType::COUNT + 1 + 1;
const AUCTION_FEATURES: usize = AnimalType::COUNT + 1 + 3 * MAX_PLAYERS;
const STACK_FEATURES: usize = 3;
const DUEL_FEATURES: usize = AnimalType::COUNT + 2 * MAX_PLAYERS + 2 * STACK_FEATURES;

impl ObservationEncoder {
    #[must_use]
    pub fn new(denominations: &[u32], action_space: ActionSpace) -> Self {
        let mut denominations = denominations.to_vec();
        denominations.sort_unstable();
        denominations.dedup();
        Self {
            denominations,
            action_space,
            money_scale: 1000.0,
            note_scale: 20.0,
        }
    }

    /// Set the money normalization constant.
    #[must_use]
    pub fn with_money_scale(mut self, scale: f32) -> Self {
        self.money_scale = scale;
        self
    }

    /// Total number of features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        PhaseKind::COUNT
            + MAX_PLAYERS
            + 1
            + self.denominations.len()
            + 1
            + MAX_PLAYERS * SEAT_FEATURES
            + AUCTION_FEATURES
            + DUEL_FEATURES
    }

    fn money(&self, value: f64) -> f32 {
        value as f32 / self.money_scale
    }
}

/// Seat relative to the observer, so the observer is always slot 0.
fn relative(observation: &Observation, seat: PlayerId) -> usize {
    let n = observation.player_count.max(1);
    (seat.index() + n - observation.player.index() % n) % n
}

fn one_hot(out: &mut Vec<f32>, size: usize, hot: Option<usize>) {
    let start = out.len();
    out.resize(start + size, 0.0);
    if let Some(i) = hot.filter(|&i| i < size) {
        out[start + i] = 1.0;
    }
}

impl StateEncoder for ObservationEncoder {
    fn encode(&self, obs: &Observation) -> EncodedState {
        let mut t = Vec::with_capacity(self.feature_count());
        let seat = |p: PlayerId| relative(obs, p);

        one_hot(&mut t, PhaseKind::COUNT, Some(obs.phase.index()));
        one_hot(&mut t, MAX_PLAYERS, Some(seat(obs.drawer)));
        t.push(obs.deck_remaining as f32 / 40.0);

        for &value in &self.denominations {
            t.push(obs.own_notes.count(value) as f32 / self.note_scale);
        }
        t.push(self.money(obs.own_money() as f64));

        let mut seats = vec![[0.0f32; SEAT_FEATURES]; MAX_PLAYERS];
        for (player, counts) in obs.herds.iter() {
            let Some(row) = seats.get_mut(seat(player)) else {
                continue;
            };
            row[0] = 1.0;
            for (i, &count) in counts.iter().enumerate() {
                row[1 + i] = f32::from(count) / f32::from(CARDS_PER_ANIMAL);
            }
            row[1 + AnimalType::COUNT] =
                obs.quartets[player].len() as f32 / AnimalType::COUNT as f32;
            row[2 + AnimalType::COUNT] = obs.note_counts[player] as f32 / self.note_scale;
        }
        t.extend(seats.iter().flatten());

        match &obs.auction {
            Some(a) => {
                one_hot(&mut t, AnimalType::COUNT, Some(a.card.animal.index()));
                t.push(self.money(f64::from(a.high_bid)));
                one_hot(&mut t, MAX_PLAYERS, a.leader.map(seat));
                let mut active = [0.0f32; MAX_PLAYERS];
                for &p in &a.active {
                    if let Some(slot) = active.get_mut(seat(p)) {
                        *slot = 1.0;
                    }
                }
                t.extend(active);
                one_hot(&mut t, MAX_PLAYERS, a.to_act.map(seat));
            }
            None => t.resize(t.len() + AUCTION_FEATURES, 0.0),
        }

        match &obs.duel {
            Some(d) => {
                one_hot(&mut t, AnimalType::COUNT, Some(d.animal.index()));
                one_hot(&mut t, MAX_PLAYERS, Some(seat(d.challenger)));
                one_hot(&mut t, MAX_PLAYERS, Some(seat(d.defender)));
                for stack in [d.challenger_stack, d.defender_stack] {
                    let StackView { note_count, top } = stack.unwrap_or(StackView {
                        note_count: 0,
                        top: None,
                    });
                    t.push(if stack.is_some() { 1.0 } else { 0.0 });
                    t.push(note_count as f32 / self.note_scale);
                    t.push(self.money(top.map_or(0.0, f64::from)));
                }
            }
            None => t.resize(t.len() + DUEL_FEATURES, 0.0),
        }

        let shape = self.output_shape();
        EncodedState::new(t, shape)
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.feature_count()]
    }

    fn action_space_size(&self) -> usize {
        self.action_space.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RulesConfig;
    use crate::rules::GameStateMachine;

    fn encoder() -> ObservationEncoder {
        ObservationEncoder::new(&[0, 10, 50, 100, 200, 500], ActionSpace::new(8, 10))
    }

    #[test]
    fn test_shape_is_fixed_across_table_sizes() {
        let encoder = encoder();
        for players in 3..=5 {
            let machine = GameStateMachine::new(RulesConfig::default().with_players(players)).unwrap();
            let state = machine.new_game(3).unwrap();
            for p in PlayerId::all(players) {
                let obs = Observation::project(&machine, &state, p, 8);
                let encoded = encoder.encode(&obs);
                assert_eq!(encoded.len(), encoder.feature_count());
                assert_eq!(encoded.shape, encoder.output_shape());
            }
        }
    }

    #[test]
    fn test_observer_is_slot_zero() {
        let machine = GameStateMachine::new(RulesConfig::default()).unwrap();
        let state = machine.new_game(3).unwrap();
        let encoder = encoder();
        // Drawer is seat 0; seat 1 sees it two slots away.
        let obs = Observation::project(&machine, &state, PlayerId::new(1), 8);
        let encoded = encoder.encode(&obs);
        let drawer_block = PhaseKind::COUNT;
        assert_eq!(encoded.get(drawer_block + 2), Some(1.0));
        assert_eq!(encoded.get(drawer_block), Some(0.0));
    }

    #[test]
    fn test_action_space_size() {
        assert_eq!(encoder().action_space_size(), 2 + 8 + MAX_PLAYERS * AnimalType::COUNT);
    }
}
