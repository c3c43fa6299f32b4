//! Convoy resolution.
//!
//! A convoyed army waits until no fleet on its route can be dislodged.
//! Armies whose route is safe survive: they cut support at their
//! destination, which can in turn save other convoys, so the check runs to
//! a fixed point. Armies still endangered when nothing changes any more are
//! all disrupted, paradoxes included.

use tracing::{debug, trace};

use super::context::{TurnContext, UnitIdx};
use super::error::{AdjudicationError, PassBudget, Stage};
use super::mark::Mark;
use super::strength::overpowering_attacker;
use crate::board::Order;

/// Resolves every queued convoy. On return `ctx.convoying_armies` is empty.
pub(crate) fn resolve_convoys(ctx: &mut TurnContext<'_>) -> Result<(), AdjudicationError> {
    if ctx.convoying_armies.is_empty() {
        return Ok(());
    }
    settle_endangerment(ctx)?;
    disrupt_remaining(ctx);
    debug!(
        succeeded = ctx.convoy_succeeded.len(),
        "convoys resolved"
    );
    Ok(())
}

/// Returns the unit that would dislodge a fleet on `army`'s route.
fn endangered_by(ctx: &TurnContext<'_>, army: UnitIdx) -> Option<UnitIdx> {
    let Order::Move { via, .. } = &ctx.records[army].order else {
        return None;
    };
    via.iter().find_map(|&sea| overpowering_attacker(ctx, sea))
}

fn survive(ctx: &mut TurnContext<'_>, army: UnitIdx) {
    trace!(army = ctx.map.abbr(ctx.records[army].unit.province), "convoy survives");
    ctx.convoying_armies.retain(|&a| a != army);
    ctx.convoy_succeeded.insert(army);
    ctx.cut_support(army, false);
}

/// Repeats until a pass lets no army through. Threatened armies are marked
/// endangered during a pass and promoted to under attack at its end.
fn settle_endangerment(ctx: &mut TurnContext<'_>) -> Result<(), AdjudicationError> {
    let ceiling = ctx.convoying_armies.len() + 1;
    let mut budget = PassBudget::new(Stage::ConvoyEndangerment, ceiling, ctx.rules.pass_limit_slack);
    loop {
        budget.tick()?;
        let mut survived = 0;
        for army in ctx.convoying_armies.clone() {
            if endangered_by(ctx, army).is_some() {
                if ctx.records[army].mark == Mark::Unmarked {
                    ctx.set_mark(army, Mark::ConvoyEndangered);
                }
            } else {
                survive(ctx, army);
                survived += 1;
            }
        }
        for army in ctx.convoying_armies.clone() {
            if ctx.records[army].mark == Mark::ConvoyEndangered {
                ctx.set_mark(army, Mark::ConvoyUnderAttack);
            }
        }
        trace!(pass = budget.used(), survived, pending = ctx.convoying_armies.len(), "endangerment pass");
        if survived == 0 {
            return Ok(());
        }
    }
}

/// Disrupts every army still waiting once no convoy can survive any more.
///
/// A disruption only weakens the disrupted army and the supports it was
/// given, none of which bear on a fight for a sea, so it never lifts the
/// threat to another route. A convoy paradox therefore fails on every side.
fn disrupt_remaining(ctx: &mut TurnContext<'_>) {
    let pending = std::mem::take(&mut ctx.convoying_armies);
    if pending.len() > 1 {
        debug!(armies = pending.len(), "disrupting remaining convoys");
    }
    for army in pending {
        disrupt(ctx, army);
    }
}

fn disrupt(ctx: &mut TurnContext<'_>, army: UnitIdx) {
    debug!(army = ctx.map.abbr(ctx.records[army].unit.province), "convoy disrupted");
    let supporters = ctx.supporters_of(army);
    ctx.set_mark(army, Mark::NoConvoy);
    let rec = &mut ctx.records[army];
    rec.support_count = 0;
    rec.no_help.clear();
    for supporter in supporters {
        ctx.set_mark(supporter, Mark::NoConvoy);
    }
    ctx.convoying_armies.retain(|&a| a != army);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardState, Map, OrderUnit, PowerId, ProvinceId, Terrain, UnitKind};
    use crate::resolve::strength::initial_strengths;
    use crate::resolve::validity::mark_invalid_orders;
    use crate::rules::Rules;

    const ENGLAND: PowerId = PowerId(0);
    const FRANCE: PowerId = PowerId(1);

    struct Sea {
        map: Map,
        lon: ProvinceId,
        bel: ProvinceId,
        nth: ProvinceId,
        eng: ProvinceId,
        hol: ProvinceId,
    }

    /// lon and bel are coasts across nth; eng and hol also border nth.
    fn sea() -> Sea {
        let mut b = Map::builder();
        b.power("England");
        b.power("France");
        let lon = b.province("lon", "London", Terrain::Coastal, true);
        let bel = b.province("bel", "Belgium", Terrain::Coastal, true);
        let nth = b.province("nth", "North Sea", Terrain::Sea, false);
        let eng = b.province("eng", "English Channel", Terrain::Sea, false);
        let hol = b.province("hol", "Holland", Terrain::Coastal, true);
        b.fleet(lon, nth).fleet(bel, nth).fleet(eng, nth).fleet(hol, nth);
        b.fleet(lon, eng).fleet(bel, eng).both(bel, hol);
        Sea {
            map: b.build().unwrap(),
            lon,
            bel,
            nth,
            eng,
            hol,
        }
    }

    fn run(map: &Map, state: &BoardState, orders: &[Order]) -> Vec<Mark> {
        let rules = Rules::default();
        let mut ctx = TurnContext::new(map, &rules, state, orders).unwrap();
        mark_invalid_orders(&mut ctx);
        initial_strengths(&mut ctx);
        resolve_convoys(&mut ctx).unwrap();
        assert!(ctx.convoying_armies.is_empty());
        ctx.records.iter().map(|r| r.mark).collect()
    }

    fn convoy_lon_bel(s: &Sea) -> [Order; 2] {
        [
            Order::move_via(OrderUnit::army(s.lon), s.bel, vec![s.nth]),
            Order::Convoy {
                unit: OrderUnit::fleet(s.nth),
                convoyed_from: s.lon,
                convoyed_to: s.bel,
            },
        ]
    }

    #[test]
    fn unthreatened_convoy_survives() {
        let s = sea();
        let mut state = BoardState::empty(&s.map);
        state.place_unit(s.lon, ENGLAND, UnitKind::Army);
        state.place_unit(s.nth, ENGLAND, UnitKind::Fleet);
        let marks = run(&s.map, &state, &convoy_lon_bel(&s));
        assert_eq!(marks, vec![Mark::Unmarked, Mark::Unmarked]);
    }

    #[test]
    fn supported_attack_on_fleet_disrupts_convoy() {
        let s = sea();
        let mut state = BoardState::empty(&s.map);
        state.place_unit(s.lon, ENGLAND, UnitKind::Army);
        state.place_unit(s.nth, ENGLAND, UnitKind::Fleet);
        state.place_unit(s.eng, FRANCE, UnitKind::Fleet);
        state.place_unit(s.hol, FRANCE, UnitKind::Fleet);
        let mut orders = convoy_lon_bel(&s).to_vec();
        orders.push(Order::move_to(OrderUnit::fleet(s.eng), s.nth));
        orders.push(Order::SupportMove {
            unit: OrderUnit::fleet(s.hol),
            supported: OrderUnit::fleet(s.eng),
            dest: s.nth,
        });
        // Records: lon, nth, eng, hol.
        let marks = run(&s.map, &state, &orders);
        assert_eq!(marks[0], Mark::NoConvoy);
        assert_eq!(marks[1], Mark::Unmarked);
    }

    #[test]
    fn lone_attack_on_fleet_is_not_enough() {
        let s = sea();
        let mut state = BoardState::empty(&s.map);
        state.place_unit(s.lon, ENGLAND, UnitKind::Army);
        state.place_unit(s.nth, ENGLAND, UnitKind::Fleet);
        state.place_unit(s.eng, FRANCE, UnitKind::Fleet);
        let mut orders = convoy_lon_bel(&s).to_vec();
        orders.push(Order::move_to(OrderUnit::fleet(s.eng), s.nth));
        let marks = run(&s.map, &state, &orders);
        assert_eq!(marks[0], Mark::Unmarked);
    }

    #[test]
    fn surviving_convoy_cuts_support_at_destination() {
        let s = sea();
        let mut state = BoardState::empty(&s.map);
        state.place_unit(s.lon, ENGLAND, UnitKind::Army);
        state.place_unit(s.nth, ENGLAND, UnitKind::Fleet);
        state.place_unit(s.bel, FRANCE, UnitKind::Fleet);
        state.place_unit(s.hol, FRANCE, UnitKind::Fleet);
        // bel supports hol holding; the convoyed army lands on bel.
        let mut orders = convoy_lon_bel(&s).to_vec();
        orders.push(Order::SupportHold {
            unit: OrderUnit::fleet(s.bel),
            supported: OrderUnit::fleet(s.hol),
        });
        // Records: lon, bel, nth, hol.
        let marks = run(&s.map, &state, &orders);
        assert_eq!(marks[0], Mark::Unmarked);
        assert_eq!(marks[1], Mark::Cut);
    }
}
