//! Validity marking.
//!
//! Runs once, before any strength is computed. Illegal or unmatched orders
//! are marked `Void` (or `NoConvoy` for a convoy request no fleet answers)
//! and resolve as holds. Valid supports are counted on the unit they help.

use std::collections::BTreeSet;

use tracing::debug;

use super::context::{TurnContext, UnitIdx};
use super::mark::Mark;
use crate::board::{Order, ProvinceId, Terrain, UnitKind};

/// Marks illegal orders and counts valid supports.
///
/// Convoys are checked first, then moves (a convoyed move needs its
/// fleets' convoy orders), then supports (a support needs the move it
/// matches to be legal).
pub(crate) fn mark_invalid_orders(ctx: &mut TurnContext<'_>) {
    let n = ctx.records.len();
    for idx in 0..n {
        if matches!(ctx.records[idx].order, Order::Convoy { .. }) && !convoy_is_valid(ctx, idx) {
            void(ctx, idx, "convoy");
        }
    }
    for idx in 0..n {
        if ctx.records[idx].order.is_move() {
            check_move(ctx, idx);
        }
    }
    for idx in 0..n {
        if ctx.records[idx].order.is_support() {
            check_support(ctx, idx);
        }
    }
}

fn void(ctx: &mut TurnContext<'_>, idx: UnitIdx, what: &str) {
    debug!(
        province = ctx.map.abbr(ctx.records[idx].unit.province),
        what, "illegal order"
    );
    ctx.set_mark(idx, Mark::Void);
}

fn convoy_is_valid(ctx: &TurnContext<'_>, idx: UnitIdx) -> bool {
    let rec = &ctx.records[idx];
    let Order::Convoy {
        convoyed_from,
        convoyed_to,
        ..
    } = rec.order
    else {
        return false;
    };
    let fleet_at = rec.unit.province;
    if rec.unit.kind != UnitKind::Fleet
        || ctx.map.terrain(fleet_at) != Terrain::Sea
        || convoyed_from == convoyed_to
    {
        return false;
    }
    let Some(army) = ctx.occupant(convoyed_from) else {
        return false;
    };
    match &ctx.records[army].order {
        Order::Move { unit, dest, via } => {
            unit.kind == UnitKind::Army && *dest == convoyed_to && via.contains(&fleet_at)
        }
        _ => false,
    }
}

fn check_move(ctx: &mut TurnContext<'_>, idx: UnitIdx) {
    let rec = &ctx.records[idx];
    let Order::Move { dest, ref via, .. } = rec.order else {
        return;
    };
    let from = rec.unit.province;
    let kind = rec.unit.kind;

    if via.is_empty() {
        if dest == from || !ctx.map.is_adjacent(from, dest, kind) {
            void(ctx, idx, "move");
        }
        return;
    }

    if kind != UnitKind::Army || !route_is_legal(ctx, from, dest, via) {
        void(ctx, idx, "convoy route");
        return;
    }
    let answered = via.iter().all(|&sea| fleet_convoys(ctx, sea, from, dest));
    if answered {
        ctx.convoying_armies.push(idx);
    } else {
        debug!(
            province = ctx.map.abbr(from),
            "convoy request not answered by every fleet on the route"
        );
        ctx.set_mark(idx, Mark::NoConvoy);
    }
}

/// A route must run from one coast to another through distinct sea
/// provinces, each fleet-adjacent to the next.
fn route_is_legal(ctx: &TurnContext<'_>, from: ProvinceId, dest: ProvinceId, via: &[ProvinceId]) -> bool {
    let map = ctx.map;
    if from == dest
        || map.terrain(from) != Terrain::Coastal
        || map.terrain(dest) != Terrain::Coastal
    {
        return false;
    }
    let mut seen = BTreeSet::new();
    if !via
        .iter()
        .all(|&sea| map.terrain(sea) == Terrain::Sea && seen.insert(sea))
    {
        return false;
    }
    std::iter::once(from)
        .chain(via.iter().copied())
        .zip(via.iter().copied().chain(std::iter::once(dest)))
        .all(|(a, b)| map.is_adjacent(a, b, UnitKind::Fleet))
}

fn fleet_convoys(ctx: &TurnContext<'_>, sea: ProvinceId, from: ProvinceId, dest: ProvinceId) -> bool {
    let Some(fleet) = ctx.occupant(sea) else {
        return false;
    };
    let rec = &ctx.records[fleet];
    rec.mark != Mark::Void
        && matches!(
            rec.order,
            Order::Convoy { convoyed_from, convoyed_to, .. }
                if convoyed_from == from && convoyed_to == dest
        )
}

enum SupportMatch {
    Matched,
    Unmatched,
    FailedConvoy,
}

fn check_support(ctx: &mut TurnContext<'_>, idx: UnitIdx) {
    let rec = &ctx.records[idx];
    let Some(target) = rec.order.support_target() else {
        return;
    };
    let Some(claimed) = rec.order.supported() else {
        return;
    };
    let supporter_at = rec.unit.province;
    let Some(supported) = ctx.occupant(claimed.location) else {
        void(ctx, idx, "support for an empty province");
        return;
    };
    if supported == idx
        || ctx.records[supported].unit.kind != claimed.kind
        || !ctx.map.is_adjacent(supporter_at, target, rec.unit.kind)
    {
        void(ctx, idx, "support");
        return;
    }

    let helped = &ctx.records[supported];
    let verdict = match (&rec.order, &helped.order) {
        (Order::SupportHold { .. }, order) => {
            if !order.is_move() || helped.mark == Mark::Void {
                SupportMatch::Matched
            } else {
                SupportMatch::Unmatched
            }
        }
        (Order::SupportMove { dest, .. }, Order::Move { dest: moving_to, .. }) => {
            match helped.mark {
                _ if dest != moving_to => SupportMatch::Unmatched,
                Mark::Void => SupportMatch::Unmatched,
                Mark::NoConvoy => SupportMatch::FailedConvoy,
                _ => SupportMatch::Matched,
            }
        }
        _ => SupportMatch::Unmatched,
    };
    match verdict {
        SupportMatch::Matched => {}
        SupportMatch::Unmatched => {
            void(ctx, idx, "unmatched support");
            return;
        }
        SupportMatch::FailedConvoy => {
            debug!(province = ctx.map.abbr(supporter_at), "support for a failed convoy");
            ctx.set_mark(idx, Mark::NoConvoy);
            return;
        }
    }

    let rec = &ctx.records[idx];
    let helped = &ctx.records[supported];
    let supporter_power = rec.unit.power;
    let against_own = helped
        .order
        .dest()
        .and_then(|dest| ctx.occupant(dest))
        .is_some_and(|victim| ctx.records[victim].unit.power == supporter_power);
    let helped = &mut ctx.records[supported];
    helped.support_count += 1;
    if against_own {
        helped.no_help.insert(idx);
    }
}
