//! Combat strength engine.
//!
//! Applies the support cuts of direct moves, builds the per-province
//! contention lists, and answers the strength questions the convoy and
//! bounce loops ask of a province.

use tracing::debug;

use super::context::{TurnContext, UnitIdx};
use crate::board::ProvinceId;

/// Cuts supports attacked by direct moves, then builds the contention lists.
///
/// Convoyed moves cut nothing here; their cuts wait until the convoy
/// survives.
pub(crate) fn initial_strengths(ctx: &mut TurnContext<'_>) {
    let mut cuts = 0;
    for idx in 0..ctx.records.len() {
        let rec = &ctx.records[idx];
        if rec.order.is_move() && !rec.order.is_convoyed_move() && !rec.mark.is_terminal() {
            cuts += usize::from(ctx.cut_support(idx, false));
        }
    }
    ctx.build_contention_lists();
    debug!(cuts, provinces = ctx.contention.len(), "initial strengths");
}

/// Returns the moves into `province` that still count as attackers.
pub(crate) fn movers_into(ctx: &TurnContext<'_>, province: ProvinceId) -> Vec<UnitIdx> {
    ctx.contenders(province)
        .iter()
        .copied()
        .filter(|&m| {
            let rec = &ctx.records[m];
            rec.order.dest() == Some(province) && !rec.mark.is_terminal()
        })
        .collect()
}

/// Returns the attacker that would take `province` from its occupant if
/// the fight were decided now: the unique strongest mover, from another
/// side, able to beat the occupant's hold strength.
///
/// Only the occupant's own power (or alliance) protects it; supports the
/// attacker cannot use against that power are discounted.
pub(crate) fn overpowering_attacker(ctx: &TurnContext<'_>, province: ProvinceId) -> Option<UnitIdx> {
    let occupant = ctx.occupant(province)?;
    let movers = movers_into(ctx, province);
    let &strongest = movers
        .iter()
        .max_by_key(|&&m| ctx.records[m].attack_strength())?;
    let top = ctx.records[strongest].attack_strength();
    if movers
        .iter()
        .any(|&m| m != strongest && ctx.records[m].attack_strength() >= top)
    {
        return None;
    }
    let attacker = &ctx.records[strongest];
    let defender = &ctx.records[occupant];
    if ctx.same_side(attacker.unit.power, defender.unit.power) {
        return None;
    }
    (attacker.dislodge_strength() > defender.hold_strength()).then_some(strongest)
}
