//! Dipjudge: a staged Diplomacy movement-phase adjudicator.
//!
//! Exposes the board representation, the resolver, the rules configuration
//! and the JSON document layer for use by integration tests and the `judge`
//! binary.

pub mod board;
pub mod logging;
pub mod protocol;
pub mod resolve;
pub mod rules;

pub use resolve::{adjudicate, adjudicate_batch, Adjudication, AdjudicationError, Outcome, ResolvedOrder, Turn};
pub use rules::Rules;
