//! Bounce resolution.
//!
//! Three rules bounce moves: the swap rule for head-to-head battles, the
//! understrength rule against rival movers and the destination's defender,
//! and the self-dislodgement rule. A bounce turns a mover into a defender of
//! its own province, which can bounce others, so the rules run together to a
//! fixed point. Each rule decides on a frozen view and then applies its
//! bounces, so the order units are visited in does not matter.

use tracing::{debug, trace};

use super::context::{TurnContext, UnitIdx};
use super::error::{AdjudicationError, PassBudget, Stage};
use super::mark::Mark;

/// Runs the bounce rules until a pass bounces nothing.
pub(crate) fn resolve_bounces(ctx: &mut TurnContext<'_>) -> Result<(), AdjudicationError> {
    let ceiling = ctx.records.iter().filter(|r| r.is_advancing()).count() + 1;
    let mut budget = PassBudget::new(Stage::Bounce, ceiling, ctx.rules.pass_limit_slack);
    loop {
        budget.tick()?;
        let swaps = apply_swap_rule(ctx);
        let weak = bounce_all(ctx, understrength_movers(ctx), "understrength");
        let own = bounce_all(ctx, self_dislodging_movers(ctx), "self-dislodgement");
        trace!(pass = budget.used(), swaps, weak, own, "bounce pass");
        if swaps + weak + own == 0 {
            return Ok(());
        }
    }
}

fn advancing(ctx: &TurnContext<'_>) -> Vec<UnitIdx> {
    (0..ctx.records.len())
        .filter(|&i| ctx.records[i].is_advancing())
        .collect()
}

fn bounce_all(ctx: &mut TurnContext<'_>, movers: Vec<UnitIdx>, rule: &str) -> usize {
    movers
        .into_iter()
        .filter(|&m| {
            let bounced = ctx.set_mark(m, Mark::Bounced);
            if bounced {
                debug!(mover = ctx.map.abbr(ctx.records[m].unit.province), rule, "bounced");
            }
            bounced
        })
        .count()
}

/// Clears every `Bounced` mark, and the head-to-head results, so the next
/// run of the bounce loop decides all moves again from current strengths.
/// Returns the number of moves reopened.
pub(crate) fn reopen_bounced(ctx: &mut TurnContext<'_>) -> usize {
    let mut reopened = 0;
    for idx in 0..ctx.records.len() {
        if ctx.records[idx].mark == Mark::Bounced && ctx.records[idx].order.is_move() {
            ctx.set_mark(idx, Mark::Unmarked);
            ctx.records[idx].beaten_by = None;
            reopened += 1;
        }
    }
    reopened
}

/// Returns the opponent of a direct move that meets a direct move coming
/// the other way.
fn head_to_head(ctx: &TurnContext<'_>, mover: UnitIdx) -> Option<UnitIdx> {
    let rec = &ctx.records[mover];
    if rec.order.is_convoyed_move() {
        return None;
    }
    let other = ctx.occupant(rec.order.dest()?)?;
    let opp = &ctx.records[other];
    (opp.is_advancing()
        && !opp.order.is_convoyed_move()
        && opp.order.dest() == Some(rec.unit.province))
    .then_some(other)
}

/// Returns true if `mover` loses its head-to-head battle with `other`.
fn loses_swap(ctx: &TurnContext<'_>, mover: UnitIdx, other: UnitIdx) -> bool {
    let (m, o) = (&ctx.records[mover], &ctx.records[other]);
    ctx.same_side(m.unit.power, o.unit.power)
        || m.support_count.saturating_sub(m.no_help.len() as u32) <= o.support_count
}

/// Decides every head-to-head battle of the pass at once. A side that loses
/// while the other wins records the winner, which cancels its prevent
/// strength.
fn apply_swap_rule(ctx: &mut TurnContext<'_>) -> usize {
    let mut verdicts = Vec::new();
    for mover in advancing(ctx) {
        if let Some(other) = head_to_head(ctx, mover) {
            if loses_swap(ctx, mover, other) {
                let winner = (!loses_swap(ctx, other, mover)).then_some(other);
                verdicts.push((mover, winner));
            }
        }
    }
    let mut bounced = 0;
    for (loser, winner) in verdicts {
        if ctx.set_mark(loser, Mark::Bounced) {
            ctx.records[loser].beaten_by = winner;
            debug!(mover = ctx.map.abbr(ctx.records[loser].unit.province), "lost head-to-head");
            bounced += 1;
        }
    }
    bounced
}

/// Movers that do not beat every rival for their destination, or cannot
/// dislodge the unit staying there.
fn understrength_movers(ctx: &TurnContext<'_>) -> Vec<UnitIdx> {
    advancing(ctx)
        .into_iter()
        .filter(|&m| {
            let rec = &ctx.records[m];
            let Some(dest) = rec.order.dest() else {
                return false;
            };
            let attack = rec.attack_strength();
            let outmatched = ctx.contenders(dest).iter().any(|&o| {
                o != m
                    && ctx.records[o].order.dest() == Some(dest)
                    && ctx.prevents(o)
                    && ctx.records[o].attack_strength() >= attack
            });
            let held = ctx
                .defender_of(dest)
                .is_some_and(|d| rec.dislodge_strength() <= ctx.records[d].hold_strength());
            outmatched || held
        })
        .collect()
}

/// Movers whose destination is held by a unit of their own side.
fn self_dislodging_movers(ctx: &TurnContext<'_>) -> Vec<UnitIdx> {
    advancing(ctx)
        .into_iter()
        .filter(|&m| {
            let rec = &ctx.records[m];
            rec.order
                .dest()
                .and_then(|dest| ctx.defender_of(dest))
                .is_some_and(|d| ctx.same_side(rec.unit.power, ctx.records[d].unit.power))
        })
        .collect()
}
