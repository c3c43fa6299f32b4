//! Order resolution.
//!
//! Resolves a movement turn in stages: validity marking, initial strengths,
//! convoy resolution, bounce resolution, dislodgement cuts and execution.
//! Each call works on its own `TurnContext`, so independent turns can be
//! adjudicated concurrently (see `adjudicate_batch`).

mod bounce;
mod context;
mod convoy;
pub mod error;
mod execute;
pub mod mark;
mod strength;
mod validity;

use rayon::prelude::*;
use tracing::instrument;

use crate::board::{BoardState, DislodgedUnit, Map, Order, PowerId};
use crate::rules::Rules;

use context::TurnContext;

pub use error::{AdjudicationError, Stage};
pub use mark::{Mark, Outcome};

/// An order paired with the power that gave it and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order: Order,
    pub power: PowerId,
    pub outcome: Outcome,
}

/// The result of adjudicating one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjudication {
    /// Board after the turn. Dislodged units are removed from `units` and
    /// listed in `dislodged`.
    pub state: BoardState,
    /// One entry per unit, in province order of the input board. Units
    /// without an order appear with their implicit hold.
    pub results: Vec<ResolvedOrder>,
    /// Units awaiting a retreat, in province order.
    pub dislodged: Vec<DislodgedUnit>,
}

/// Adjudicates one movement turn.
///
/// Units without an order hold. Illegal orders are not errors: they are
/// reported as `Outcome::Void` (or `Outcome::NoConvoy`) and hold. The input
/// state is left untouched.
#[instrument(level = "debug", skip_all, fields(units = state.unit_count(), orders = orders.len()))]
pub fn adjudicate(
    map: &Map,
    state: &BoardState,
    orders: &[Order],
    rules: &Rules,
) -> Result<Adjudication, AdjudicationError> {
    let mut ctx = TurnContext::new(map, rules, state, orders)?;
    validity::mark_invalid_orders(&mut ctx);
    strength::initial_strengths(&mut ctx);
    convoy::resolve_convoys(&mut ctx)?;
    bounce::resolve_bounces(&mut ctx)?;
    execute::apply_dislodgement_cuts(&mut ctx)?;
    execute::execute(&mut ctx)
}

/// One independent turn for `adjudicate_batch`.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub map: &'a Map,
    pub state: &'a BoardState,
    pub orders: &'a [Order],
    pub rules: &'a Rules,
}

/// Adjudicates independent turns in parallel. Results are in input order
/// and identical to calling `adjudicate` on each turn.
pub fn adjudicate_batch(turns: &[Turn<'_>]) -> Vec<Result<Adjudication, AdjudicationError>> {
    turns
        .par_iter()
        .map(|t| adjudicate(t.map, t.state, t.orders, t.rules))
        .collect()
}
