//! Ascending open auction for a drawn card.
//!
//! The drawer never bids but collects the price. Nobody bidding at all is a
//! defined outcome: the drawer buys the card at the floor price.

pub mod engine;

pub use engine::{AuctionEngine, AuctionResult, AuctionStatus, Bidders};
