//! Money: note multisets, player holdings, and the unlimited bank.
//!
//! - `Notes`: counts per face value, with payment-combination search
//! - `Ledger`: the only place money moves; keeps the conservation invariant

pub mod holdings;
pub mod notes;

pub use holdings::{Holder, Ledger, LedgerError, Payment};
pub use notes::Notes;
