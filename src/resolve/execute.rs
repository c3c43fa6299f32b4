//! Dislodgement and move execution.

use tracing::debug;

use super::bounce::{reopen_bounced, resolve_bounces};
use super::context::TurnContext;
use super::error::{AdjudicationError, PassBudget, Stage};
use super::mark::{Mark, Outcome};
use super::{Adjudication, ResolvedOrder};
use crate::board::{BoardState, DislodgedUnit};

/// Cuts the support of every unit about to be dislodged, including support
/// into the attacker's own province. A cut can weaken the moves it helped
/// and so free their rivals: after each round that cut something, every
/// bounced move is reopened and the bounce loop decides them again.
pub(crate) fn apply_dislodgement_cuts(ctx: &mut TurnContext<'_>) -> Result<(), AdjudicationError> {
    let supporters = ctx.records.iter().filter(|r| r.order.is_support()).count();
    let mut budget = PassBudget::new(Stage::DislodgementCuts, supporters + 1, ctx.rules.pass_limit_slack);
    loop {
        budget.tick()?;
        let mut cuts = 0;
        for mover in 0..ctx.records.len() {
            if !ctx.records[mover].is_advancing() {
                continue;
            }
            let under_attack = ctx.records[mover]
                .order
                .dest()
                .and_then(|dest| ctx.defender_of(dest));
            if under_attack.is_some() && ctx.cut_support(mover, true) {
                cuts += 1;
            }
        }
        if cuts == 0 {
            return Ok(());
        }
        let reopened = reopen_bounced(ctx);
        debug!(cuts, reopened, "supports cut by dislodgement");
        resolve_bounces(ctx)?;
    }
}

/// Applies the settled marks: moves advancing units, removes the units they
/// dislodge, and reports one result per unit in province order.
pub(crate) fn execute(ctx: &mut TurnContext<'_>) -> Result<Adjudication, AdjudicationError> {
    let mut dislodged = Vec::new();
    for mover in 0..ctx.records.len() {
        if !ctx.records[mover].is_advancing() {
            continue;
        }
        let Some(dest) = ctx.records[mover].order.dest() else {
            continue;
        };
        if let Some(victim) = ctx.defender_of(dest) {
            ctx.set_mark(victim, Mark::Dislodged);
            let unit = ctx.records[victim].unit;
            dislodged.push(DislodgedUnit {
                power: unit.power,
                kind: unit.kind,
                province: unit.province,
                attacker_from: ctx.records[mover].unit.province,
            });
        }
    }
    dislodged.sort_by_key(|d| d.province);

    let mut state = BoardState::with_capacity(ctx.map.province_count());
    for d in &dislodged {
        state.set_dislodged(*d);
    }
    for rec in &ctx.records {
        let unit = rec.unit;
        if dislodged.iter().any(|d| d.province == unit.province) {
            continue;
        }
        let lands_in = if rec.is_advancing() {
            rec.order.dest().unwrap_or(unit.province)
        } else {
            unit.province
        };
        if !state.place_unit(lands_in, unit.power, unit.kind) {
            return Err(AdjudicationError::OccupancyConflict(
                ctx.map.abbr(lands_in).to_string(),
            ));
        }
    }

    let results = ctx
        .records
        .iter()
        .map(|rec| ResolvedOrder {
            order: rec.order.clone(),
            power: rec.unit.power,
            outcome: Outcome::from(rec.mark),
        })
        .collect();
    debug!(
        moved = ctx.records.iter().filter(|r| r.is_advancing()).count(),
        dislodged = dislodged.len(),
        "turn executed"
    );
    Ok(Adjudication {
        state,
        results,
        dislodged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Map, Order, OrderUnit, PowerId, ProvinceId, Terrain, UnitKind};
    use crate::resolve::convoy::resolve_convoys;
    use crate::resolve::strength::initial_strengths;
    use crate::resolve::validity::mark_invalid_orders;
    use crate::rules::Rules;

    const FRANCE: PowerId = PowerId(0);
    const GERMANY: PowerId = PowerId(1);

    /// Mutually adjacent land provinces.
    fn clique_of<const N: usize>(names: [&str; N]) -> (Map, [ProvinceId; N]) {
        let mut b = Map::builder();
        b.power("France");
        b.power("Germany");
        let p = names.map(|n| b.province(n, n, Terrain::Land, true));
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                b.army(p[i], p[j]);
            }
        }
        (b.build().unwrap(), p)
    }

    fn clique() -> (Map, [ProvinceId; 5]) {
        clique_of(["bur", "mun", "ruh", "kie", "bel"])
    }

    fn run(map: &Map, state: &BoardState, orders: &[Order]) -> Adjudication {
        let rules = Rules::default();
        let mut ctx = TurnContext::new(map, &rules, state, orders).unwrap();
        mark_invalid_orders(&mut ctx);
        initial_strengths(&mut ctx);
        resolve_convoys(&mut ctx).unwrap();
        resolve_bounces(&mut ctx).unwrap();
        apply_dislodgement_cuts(&mut ctx).unwrap();
        execute(&mut ctx).unwrap()
    }

    fn outcomes(adj: &Adjudication) -> Vec<Outcome> {
        adj.results.iter().map(|r| r.outcome).collect()
    }

    #[test]
    fn dislodged_supporter_loses_support_into_attackers_province() {
        let (map, [bur, mun, ruh, kie, bel]) = clique();
        let mut state = BoardState::empty(&map);
        state.place_unit(bur, FRANCE, UnitKind::Army);
        state.place_unit(ruh, FRANCE, UnitKind::Army);
        state.place_unit(bel, FRANCE, UnitKind::Army);
        state.place_unit(mun, GERMANY, UnitKind::Army);
        state.place_unit(kie, GERMANY, UnitKind::Army);
        let orders = [
            Order::move_to(OrderUnit::army(bur), mun),
            Order::SupportMove {
                unit: OrderUnit::army(bel),
                supported: OrderUnit::army(bur),
                dest: mun,
            },
            Order::move_to(OrderUnit::army(ruh), bur),
            Order::move_to(OrderUnit::army(kie), bur),
            Order::SupportMove {
                unit: OrderUnit::army(mun),
                supported: OrderUnit::army(kie),
                dest: bur,
            },
        ];
        let adj = run(&map, &state, &orders);
        // bur, mun, ruh, kie, bel
        assert_eq!(
            outcomes(&adj),
            vec![
                Outcome::Succeeded,
                Outcome::Dislodged,
                Outcome::Bounced,
                Outcome::Bounced,
                Outcome::Succeeded,
            ]
        );
        assert_eq!(adj.state.unit_at(mun).map(|u| u.power), Some(FRANCE));
        assert!(adj.state.unit_at(bur).is_none());
        assert_eq!(
            adj.dislodged,
            vec![DislodgedUnit {
                power: GERMANY,
                kind: UnitKind::Army,
                province: mun,
                attacker_from: bur,
            }]
        );
        assert_eq!(adj.state.dislodged_units().count(), 1);
    }

    #[test]
    fn dislodgement_cut_reopens_the_standoff_it_caused() {
        let (map, [bur, mun, par, pic, ruh, bel]) =
            clique_of(["bur", "mun", "par", "pic", "ruh", "bel"]);
        let mut state = BoardState::empty(&map);
        for p in [bur, par, pic, ruh] {
            state.place_unit(p, FRANCE, UnitKind::Army);
        }
        state.place_unit(mun, GERMANY, UnitKind::Army);
        state.place_unit(bel, GERMANY, UnitKind::Army);
        let orders = [
            Order::move_to(OrderUnit::army(bur), mun),
            Order::SupportMove {
                unit: OrderUnit::army(ruh),
                supported: OrderUnit::army(bur),
                dest: mun,
            },
            Order::move_to(OrderUnit::army(par), bur),
            Order::SupportMove {
                unit: OrderUnit::army(pic),
                supported: OrderUnit::army(par),
                dest: bur,
            },
            Order::move_to(OrderUnit::army(bel), bur),
            Order::SupportMove {
                unit: OrderUnit::army(mun),
                supported: OrderUnit::army(bel),
                dest: bur,
            },
        ];
        let adj = run(&map, &state, &orders);
        // bur, mun, par, pic, ruh, bel
        assert_eq!(
            outcomes(&adj),
            vec![
                Outcome::Succeeded,
                Outcome::Dislodged,
                Outcome::Succeeded,
                Outcome::Succeeded,
                Outcome::Succeeded,
                Outcome::Bounced,
            ]
        );
        assert_eq!(adj.state.unit_at(bur).map(|u| u.power), Some(FRANCE));
        assert_eq!(adj.state.unit_at(mun).map(|u| u.power), Some(FRANCE));
        assert!(adj.state.unit_at(par).is_none());
    }

    #[test]
    fn void_order_keeps_its_mark_when_dislodged() {
        let (map, [bur, mun, ruh, _, _]) = clique();
        let mut state = BoardState::empty(&map);
        state.place_unit(bur, FRANCE, UnitKind::Army);
        state.place_unit(ruh, FRANCE, UnitKind::Army);
        state.place_unit(mun, GERMANY, UnitKind::Army);
        let orders = [
            Order::move_to(OrderUnit::army(bur), mun),
            Order::SupportMove {
                unit: OrderUnit::army(ruh),
                supported: OrderUnit::army(bur),
                dest: mun,
            },
            Order::move_to(OrderUnit::army(mun), mun),
        ];
        let adj = run(&map, &state, &orders);
        assert_eq!(
            outcomes(&adj),
            vec![Outcome::Succeeded, Outcome::Void, Outcome::Succeeded]
        );
        assert_eq!(adj.dislodged.len(), 1);
        assert_eq!(adj.dislodged[0].province, mun);
        assert_eq!(adj.state.unit_count(), 2);
    }

    #[test]
    fn rotation_moves_every_unit() {
        let (map, [bur, mun, ruh, _, _]) = clique();
        let mut state = BoardState::empty(&map);
        state.place_unit(bur, FRANCE, UnitKind::Army);
        state.place_unit(mun, GERMANY, UnitKind::Army);
        state.place_unit(ruh, FRANCE, UnitKind::Army);
        let orders = [
            Order::move_to(OrderUnit::army(bur), mun),
            Order::move_to(OrderUnit::army(mun), ruh),
            Order::move_to(OrderUnit::army(ruh), bur),
        ];
        let adj = run(&map, &state, &orders);
        assert!(outcomes(&adj).iter().all(|&o| o == Outcome::Succeeded));
        assert_eq!(adj.state.unit_at(ruh).map(|u| u.power), Some(GERMANY));
        assert_eq!(adj.state.unit_at(bur).map(|u| u.power), Some(FRANCE));
        assert!(adj.dislodged.is_empty());
    }
}
