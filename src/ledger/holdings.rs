//! Player holdings and the bank.
//!
//! Every movement of money in a match goes through [`Ledger`]. The bank has an
//! unlimited supply, so the invariant kept here is
//! `sum(player totals) == initial_total + issued - absorbed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::notes::Notes;
use crate::core::{PlayerId, PlayerMap};

/// Who money moves between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    Player(PlayerId),
    Bank,
}

impl std::fmt::Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Holder::Player(p) => write!(f, "{p}"),
            Holder::Bank => f.write_str("Bank"),
        }
    }
}

/// Ledger failures. Both are recoverable; nothing moves when one is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("{holder} holds {held} note(s) of {denomination}, needs {requested}")]
    InsufficientFunds {
        holder: Holder,
        denomination: u32,
        requested: u32,
        held: u32,
    },

    #[error("{holder} has {available} in total, owes {owed}")]
    CannotCover {
        holder: Holder,
        owed: u64,
        available: u64,
    },

    #[error("unknown denomination {0}")]
    UnknownDenomination(u32),

    #[error("{0} cannot be paid exactly in the configured denominations")]
    Unrepresentable(u64),

    #[error("{0} is not seated at this table")]
    UnknownPlayer(PlayerId),
}

/// Notes that changed hands for one payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Notes handed over by the payer.
    pub paid: Notes,
    /// Notes returned by the payee (only with change-giving).
    pub change: Notes,
}

impl Payment {
    /// Net amount that moved from payer to payee.
    #[must_use]
    pub fn net(&self) -> u64 {
        self.paid.total_value().saturating_sub(self.change.total_value())
    }
}

/// Money holdings for every seat plus the bank's running totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    holdings: PlayerMap<Notes>,
    denominations: Vec<u32>,
    initial_total: u64,
    issued: u64,
    absorbed: u64,
}

impl Ledger {
    /// Create a ledger and deal `starting` notes to every seat from the bank.
    ///
    /// The deal defines the initial total; it does not count as issued money.
    #[must_use]
    pub fn deal(player_count: usize, denominations: &[u32], starting: &Notes) -> Self {
        let mut denominations = denominations.to_vec();
        denominations.sort_unstable();
        denominations.dedup();

        Self {
            holdings: PlayerMap::with_value(player_count, starting.clone()),
            denominations,
            initial_total: starting.total_value() * player_count as u64,
            issued: 0,
            absorbed: 0,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.holdings.player_count()
    }

    /// Configured face values, ascending.
    #[must_use]
    pub fn denominations(&self) -> &[u32] {
        &self.denominations
    }

    /// A player's exact holdings.
    ///
    /// # Panics
    ///
    /// Panics if `player` is not seated; callers validate seats first.
    #[must_use]
    pub fn balance(&self, player: PlayerId) -> &Notes {
        &self.holdings[player]
    }

    /// Sum of a player's notes.
    #[must_use]
    pub fn total_value(&self, player: PlayerId) -> u64 {
        self.holdings.get(player).map_or(0, Notes::total_value)
    }

    /// Number of notes a player holds (public information).
    #[must_use]
    pub fn note_count(&self, player: PlayerId) -> u32 {
        self.holdings.get(player).map_or(0, Notes::note_count)
    }

    /// Sum of all players' money.
    #[must_use]
    pub fn players_total(&self) -> u64 {
        self.holdings.values().map(Notes::total_value).sum()
    }

    #[must_use]
    pub fn initial_total(&self) -> u64 {
        self.initial_total
    }

    /// Money created by the bank (quartet payouts).
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Money paid into the bank.
    #[must_use]
    pub fn absorbed(&self) -> u64 {
        self.absorbed
    }

    /// Check that `player` could hand over exactly `notes`.
    pub fn validate(&self, player: PlayerId, notes: &Notes) -> Result<(), LedgerError> {
        self.check_denominations(notes)?;
        let held = self
            .holdings
            .get(player)
            .ok_or(LedgerError::UnknownPlayer(player))?;
        match held.shortage(notes) {
            Some((denomination, requested, held)) => Err(LedgerError::InsufficientFunds {
                holder: Holder::Player(player),
                denomination,
                requested,
                held,
            }),
            None => Ok(()),
        }
    }

    /// Move an exact multiset of notes. Nothing moves on error.
    pub fn transfer(&mut self, from: Holder, to: Holder, notes: &Notes) -> Result<(), LedgerError> {
        self.check_denominations(notes)?;
        if let Holder::Player(p) = from {
            self.validate(p, notes)?;
        }
        if let Holder::Player(p) = to {
            if !self.holdings.contains(p) {
                return Err(LedgerError::UnknownPlayer(p));
            }
        }

        match from {
            Holder::Player(p) => {
                let held = &mut self.holdings[p];
                held.remove_all(notes).map_err(|(denomination, requested, held)| {
                    LedgerError::InsufficientFunds {
                        holder: from,
                        denomination,
                        requested,
                        held,
                    }
                })?;
            }
            Holder::Bank => self.issued += notes.total_value(),
        }
        match to {
            Holder::Player(p) => self.holdings[p].add_all(notes),
            Holder::Bank => self.absorbed += notes.total_value(),
        }
        Ok(())
    }

    /// Swap two committed stacks between players atomically.
    ///
    /// Both stacks are validated before either moves, so neither side's
    /// holdings can be affected by the other's rejection.
    pub fn exchange(
        &mut self,
        a: PlayerId,
        a_notes: &Notes,
        b: PlayerId,
        b_notes: &Notes,
    ) -> Result<(), LedgerError> {
        self.validate(a, a_notes)?;
        self.validate(b, b_notes)?;
        if a == b {
            let mut both = a_notes.clone();
            both.add_all(b_notes);
            return self.validate(a, &both);
        }

        for (player, notes) in [(a, a_notes), (b, b_notes)] {
            self.holdings[player]
                .remove_all(notes)
                .map_err(|(denomination, requested, held)| LedgerError::InsufficientFunds {
                    holder: Holder::Player(player),
                    denomination,
                    requested,
                    held,
                })?;
        }
        self.holdings[b].add_all(a_notes);
        self.holdings[a].add_all(b_notes);
        Ok(())
    }

    /// Pay `amount` from `from` to `to`.
    ///
    /// A player pays with the combination of its notes closest to `amount`
    /// from above. With `give_change`, a player payee returns the best change it
    /// can make from the notes it held before the payment. The bank mints
    /// exactly `amount`; it fails only if the denominations cannot form it.
    pub fn pay(
        &mut self,
        from: Holder,
        to: Holder,
        amount: u64,
        give_change: bool,
    ) -> Result<Payment, LedgerError> {
        if amount == 0 {
            return Ok(Payment::default());
        }

        let paid = match from {
            Holder::Bank => Notes::mint(amount, &self.denominations)
                .ok_or(LedgerError::Unrepresentable(amount))?,
            Holder::Player(p) => {
                let held = self.holdings.get(p).ok_or(LedgerError::UnknownPlayer(p))?;
                held.cover(amount).ok_or(LedgerError::CannotCover {
                    holder: from,
                    owed: amount,
                    available: held.total_value(),
                })?
            }
        };

        let overpaid = paid
            .total_value()
            .checked_sub(amount)
            .ok_or(LedgerError::CannotCover {
                holder: from,
                owed: amount,
                available: paid.total_value(),
            })?;
        let change = match to {
            Holder::Player(payee) if give_change && overpaid > 0 => {
                self.holdings[payee].best_within(overpaid)
            }
            _ => Notes::new(),
        };

        self.transfer(from, to, &paid)?;
        if !change.is_empty() {
            self.transfer(to, from, &change)?;
        }

        Ok(Payment { paid, change })
    }

    /// Conservation check; returns a description of the imbalance.
    pub fn check_conservation(&self) -> Result<(), String> {
        let expected = (self.initial_total + self.issued).checked_sub(self.absorbed);
        let actual = self.players_total();
        if expected == Some(actual) {
            Ok(())
        } else {
            Err(format!(
                "players hold {actual}, expected {} + {} - {}",
                self.initial_total, self.issued, self.absorbed
            ))
        }
    }

    fn check_denominations(&self, notes: &Notes) -> Result<(), LedgerError> {
        match notes.iter().find(|(v, _)| self.denominations.binary_search(v).is_err()) {
            Some((value, _)) => Err(LedgerError::UnknownDenomination(value)),
            None => Ok(()),
        }
    }
}
