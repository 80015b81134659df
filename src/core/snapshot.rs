//! Serializable snapshots of a match.
//!
//! A snapshot is the rule set plus the full state. Restoring one and replaying
//! the same actions reproduces the same events, which is what replay tooling
//! and divergence checks rely on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::RulesConfig;
use super::state::GameState;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("binary snapshot: {0}")]
    Binary(#[from] bincode::Error),

    #[error("JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot does not match its rule set: {0}")]
    Inconsistent(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: RulesConfig,
    pub state: GameState,
}

impl Snapshot {
    #[must_use]
    pub fn new(config: RulesConfig, state: GameState) -> Self {
        Self { config, state }
    }

    /// Compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and sanity-check a binary snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    /// Pretty JSON, for debugging and fixtures.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    fn verify(&self) -> Result<(), SnapshotError> {
        self.config
            .validate()
            .map_err(|e| SnapshotError::Inconsistent(e.to_string()))?;
        if self.state.player_count() != self.config.num_players {
            return Err(SnapshotError::Inconsistent(format!(
                "{} seats in state, {} in config",
                self.state.player_count(),
                self.config.num_players
            )));
        }
        self.state
            .check_invariants()
            .map_err(SnapshotError::Inconsistent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Deck;
    use crate::ledger::Ledger;

    fn snapshot() -> Snapshot {
        let config = RulesConfig::default();
        let ledger = Ledger::deal(
            config.num_players,
            &config.denominations,
            &config.starting_notes,
        );
        let state = GameState::new(3, ledger, Deck::new(&config.animals));
        Snapshot::new(config, state)
    }

    #[test]
    fn test_binary_round_trip() {
        let snap = snapshot();
        let bytes = snap.to_bytes().unwrap();
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snap);
    }

    #[test]
    fn test_json_round_trip() {
        let snap = snapshot();
        let json = snap.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap(), snap);
    }

    #[test]
    fn test_seat_mismatch_rejected() {
        let mut snap = snapshot();
        snap.config.num_players = 4;
        let bytes = snap.to_bytes().unwrap();
        assert!(matches!(
            Snapshot::from_bytes(&bytes),
            Err(SnapshotError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            Snapshot::from_bytes(&[1, 2, 3]),
            Err(SnapshotError::Binary(_))
        ));
    }
}
