//! Turn context: the working set threaded through every adjudication stage.
//!
//! A `TurnContext` is created fresh for each call to `adjudicate` and dropped
//! when it returns. It holds one `UnitRecord` per unit on the board (with the
//! unit's order, mark and support bookkeeping), the per-province contention
//! lists, and the convoy working sets.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use super::error::AdjudicationError;
use super::mark::Mark;
use crate::board::{BoardState, Map, Order, PowerId, ProvinceId, Unit};
use crate::rules::{Rules, SelfDislodge};

/// Index of a unit in `TurnContext::records`.
pub(crate) type UnitIdx = usize;

/// Adjudication state of one unit.
#[derive(Debug, Clone)]
pub(crate) struct UnitRecord {
    pub unit: Unit,
    pub order: Order,
    pub mark: Mark,
    /// Valid, uncut supports received.
    pub support_count: u32,
    /// Supporters whose support does not count toward dislodging a unit of
    /// their own power. Always a subset of the counted supporters.
    pub no_help: BTreeSet<UnitIdx>,
    /// Head-to-head opponent that beat this unit's move.
    pub beaten_by: Option<UnitIdx>,
}

impl UnitRecord {
    fn new(unit: Unit) -> Self {
        UnitRecord {
            order: Order::hold(crate::board::OrderUnit {
                kind: unit.kind,
                location: unit.province,
            }),
            unit,
            mark: Mark::Unmarked,
            support_count: 0,
            no_help: BTreeSet::new(),
            beaten_by: None,
        }
    }

    /// Returns true for a move that has not failed (yet).
    pub fn is_advancing(&self) -> bool {
        self.order.is_move() && self.mark.allows_movement()
    }

    /// Strength against other units moving to the same province.
    pub fn attack_strength(&self) -> u32 {
        1 + self.support_count
    }

    /// Strength against the unit occupying the destination.
    pub fn dislodge_strength(&self) -> u32 {
        1 + self.support_count.saturating_sub(self.no_help.len() as u32)
    }

    /// Strength of the unit defending its own province. Supports given to a
    /// failed move do not help it hold.
    pub fn hold_strength(&self) -> u32 {
        if self.order.is_move() {
            1
        } else {
            1 + self.support_count
        }
    }

    /// Removes one counted supporter.
    fn lose_support(&mut self, supporter: UnitIdx) {
        debug_assert!(self.support_count > 0, "support count would go negative");
        self.support_count = self.support_count.saturating_sub(1);
        self.no_help.remove(&supporter);
        debug_assert!(self.no_help.len() as u32 <= self.support_count);
    }
}

/// Mutable working set for one turn.
#[derive(Debug)]
pub(crate) struct TurnContext<'a> {
    pub map: &'a Map,
    pub rules: &'a Rules,
    pub records: Vec<UnitRecord>,
    /// Unit index at each province in the input snapshot.
    occupants: Vec<Option<UnitIdx>>,
    /// Alliance group of each power, by `PowerId::index()`.
    alliance_of: Vec<Option<usize>>,
    /// Units moving into or remaining in each province.
    pub contention: BTreeMap<ProvinceId, Vec<UnitIdx>>,
    /// Convoyed armies whose convoy is not resolved yet.
    pub convoying_armies: Vec<UnitIdx>,
    /// Convoyed armies whose convoy survived.
    pub convoy_succeeded: BTreeSet<UnitIdx>,
}

impl<'a> TurnContext<'a> {
    /// Builds the context, assigning every unit its submitted order or an
    /// implicit hold.
    pub fn new(
        map: &'a Map,
        rules: &'a Rules,
        state: &BoardState,
        orders: &[Order],
    ) -> Result<Self, AdjudicationError> {
        if state.province_count() != map.province_count() {
            return Err(AdjudicationError::MapMismatch {
                state: state.province_count(),
                map: map.province_count(),
            });
        }

        let mut occupants = vec![None; map.province_count()];
        let mut records = Vec::with_capacity(state.unit_count());
        for (i, slot) in state.units.iter().enumerate() {
            if let Some(unit) = slot {
                let province = ProvinceId(i as u16);
                occupants[i] = Some(records.len());
                records.push(UnitRecord::new(Unit { province, ..*unit }));
            }
        }

        let mut ordered = vec![false; records.len()];
        for order in orders {
            if let Some(bad) = order.provinces().into_iter().find(|p| !map.contains(*p)) {
                return Err(AdjudicationError::UnknownProvince(bad.0));
            }
            let issuer = order.unit();
            let idx = occupants[issuer.location.index()]
                .ok_or_else(|| AdjudicationError::NoUnit(map.abbr(issuer.location).to_string()))?;
            let actual = records[idx].unit.kind;
            if actual != issuer.kind {
                return Err(AdjudicationError::UnitKindMismatch {
                    province: map.abbr(issuer.location).to_string(),
                    found: issuer.kind,
                    actual,
                });
            }
            if std::mem::replace(&mut ordered[idx], true) {
                return Err(AdjudicationError::DuplicateOrder(
                    map.abbr(issuer.location).to_string(),
                ));
            }
            records[idx].order = order.clone();
        }

        let mut alliance_of = vec![None; map.powers().len()];
        for (group, names) in rules.alliances.iter().enumerate() {
            for name in names {
                let power = map
                    .power_id(name)
                    .ok_or_else(|| AdjudicationError::UnknownAlliancePower(name.clone()))?;
                alliance_of[power.index()] = Some(group);
            }
        }

        Ok(TurnContext {
            map,
            rules,
            records,
            occupants,
            alliance_of,
            contention: BTreeMap::new(),
            convoying_armies: Vec::new(),
            convoy_succeeded: BTreeSet::new(),
        })
    }

    /// Returns the unit that started the turn in `province`.
    pub fn occupant(&self, province: ProvinceId) -> Option<UnitIdx> {
        self.occupants.get(province.index()).copied().flatten()
    }

    /// Returns the unit a support order is given to.
    pub fn supported_idx(&self, supporter: UnitIdx) -> Option<UnitIdx> {
        let supported = self.records[supporter].order.supported()?;
        self.occupant(supported.location)
    }

    /// Returns the unit that will still be in `province` unless dislodged:
    /// its occupant, if that occupant is not moving away.
    pub fn defender_of(&self, province: ProvinceId) -> Option<UnitIdx> {
        self.occupant(province)
            .filter(|&d| !self.records[d].is_advancing())
    }

    /// Returns true if a moving unit still stops others from entering its
    /// destination. A unit that lost a head-to-head battle stops no one while
    /// the winner is advancing.
    pub fn prevents(&self, idx: UnitIdx) -> bool {
        let rec = &self.records[idx];
        if !rec.order.is_move() || matches!(rec.mark, Mark::Void | Mark::NoConvoy) {
            return false;
        }
        match rec.beaten_by {
            Some(winner) => !self.records[winner].is_advancing(),
            None => true,
        }
    }

    /// Returns true if `mover` is not allowed to dislodge a unit of `owner`.
    pub fn same_side(&self, mover: PowerId, owner: PowerId) -> bool {
        if mover == owner {
            return true;
        }
        match self.rules.self_dislodge {
            SelfDislodge::SamePower => false,
            SelfDislodge::SameAlliance => {
                let group = |p: PowerId| self.alliance_of.get(p.index()).copied().flatten();
                matches!((group(mover), group(owner)), (Some(a), Some(b)) if a == b)
            }
        }
    }

    /// Sets a mark unless the current one is terminal. Returns true if the
    /// mark changed.
    pub fn set_mark(&mut self, idx: UnitIdx, mark: Mark) -> bool {
        let rec = &mut self.records[idx];
        if rec.mark.is_terminal() || rec.mark == mark {
            return false;
        }
        trace!(
            province = self.map.abbr(rec.unit.province),
            from = ?rec.mark,
            to = ?mark,
            "mark"
        );
        rec.mark = mark;
        true
    }

    /// Returns the province whose contention list a unit belongs to: the
    /// destination of a live move, otherwise its own province.
    pub fn contention_target(&self, idx: UnitIdx) -> ProvinceId {
        let rec = &self.records[idx];
        match rec.order.dest() {
            Some(dest) if !rec.mark.is_terminal() => dest,
            _ => rec.unit.province,
        }
    }

    /// Builds the contention lists. Called once per turn; later stages only
    /// mutate the units they reference.
    pub fn build_contention_lists(&mut self) {
        self.contention.clear();
        for idx in 0..self.records.len() {
            let target = self.contention_target(idx);
            self.contention.entry(target).or_default().push(idx);
        }
    }

    /// Returns the units contending for `province`.
    pub fn contenders(&self, province: ProvinceId) -> &[UnitIdx] {
        self.contention
            .get(&province)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the units whose support currently counts for `supported`.
    pub fn supporters_of(&self, supported: UnitIdx) -> Vec<UnitIdx> {
        (0..self.records.len())
            .filter(|&s| {
                self.records[s].order.is_support()
                    && self.records[s].mark.support_counts()
                    && self.supported_idx(s) == Some(supported)
            })
            .collect()
    }

    /// Cuts the support of the unit at `attacker`'s destination if the rules
    /// allow it. Returns true if a support was cut.
    ///
    /// Outside the dislodgement pass (`step_nine`), a support directed into
    /// the attacker's own province is not cut by that attack.
    pub fn cut_support(&mut self, attacker: UnitIdx, step_nine: bool) -> bool {
        let Some(dest) = self.records[attacker].order.dest() else {
            return false;
        };
        let Some(supporter) = self.occupant(dest) else {
            return false;
        };
        if supporter == attacker || !self.would_cut(attacker, supporter, step_nine) {
            return false;
        }

        debug!(
            supporter = self.map.abbr(self.records[supporter].unit.province),
            attacker = self.map.abbr(self.records[attacker].unit.province),
            step_nine,
            "support cut"
        );
        self.records[supporter].mark = Mark::Cut;
        if let Some(supported) = self.supported_idx(supporter) {
            self.records[supported].lose_support(supporter);
        }
        true
    }

    /// Returns true if an attack by `attacker` would cut `supporter`'s support.
    pub fn would_cut(&self, attacker: UnitIdx, supporter: UnitIdx, step_nine: bool) -> bool {
        let s = &self.records[supporter];
        let a = &self.records[attacker];
        if !s.order.is_support() || !s.mark.support_counts() {
            return false;
        }
        if s.unit.power == a.unit.power {
            return false;
        }
        let target = s.order.support_target();
        if let Order::Move { via, .. } = &a.order {
            // Support for or against a fleet of the attacker's own convoy.
            if target.is_some_and(|t| via.contains(&t)) {
                return false;
            }
        }
        if !step_nine && target == Some(a.unit.province) {
            return false;
        }
        true
    }
}
