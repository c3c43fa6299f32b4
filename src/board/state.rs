//! Board snapshot.
//!
//! Holds the placement of every unit at one point in time, plus the units
//! dislodged by the last movement turn that are waiting for a retreat.

use super::map::{Map, PowerId, ProvinceId};
use super::unit::{Unit, UnitKind};

/// A dislodged unit with information about the attacking province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DislodgedUnit {
    pub power: PowerId,
    pub kind: UnitKind,
    pub province: ProvinceId,
    pub attacker_from: ProvinceId,
}

/// Unit placement at a point in time.
///
/// Both tables are indexed by `ProvinceId::index()` and sized to the map the
/// state was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    /// Unit at each province.
    pub units: Vec<Option<Unit>>,
    /// Dislodged units awaiting retreat orders.
    pub dislodged: Vec<Option<DislodgedUnit>>,
}

impl BoardState {
    /// Creates an empty state for the given map.
    pub fn empty(map: &Map) -> Self {
        Self::with_capacity(map.province_count())
    }

    pub(crate) fn with_capacity(province_count: usize) -> Self {
        BoardState {
            units: vec![None; province_count],
            dislodged: vec![None; province_count],
        }
    }

    /// Returns the number of provinces this state covers.
    pub fn province_count(&self) -> usize {
        self.units.len()
    }

    /// Places a unit on the board. Returns false if the province is already
    /// occupied or outside the board.
    pub fn place_unit(&mut self, province: ProvinceId, power: PowerId, kind: UnitKind) -> bool {
        match self.units.get_mut(province.index()) {
            Some(slot @ None) => {
                *slot = Some(Unit { power, kind, province });
                true
            }
            _ => false,
        }
    }

    /// Returns the unit in a province, if any.
    pub fn unit_at(&self, province: ProvinceId) -> Option<&Unit> {
        self.units.get(province.index()).and_then(Option::as_ref)
    }

    /// Iterates over placed units in province order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().flatten()
    }

    /// Returns the number of units on the board.
    pub fn unit_count(&self) -> usize {
        self.units().count()
    }

    /// Records a dislodged unit at its province.
    pub fn set_dislodged(&mut self, dislodged: DislodgedUnit) {
        if let Some(slot) = self.dislodged.get_mut(dislodged.province.index()) {
            *slot = Some(dislodged);
        }
    }

    /// Iterates over dislodged units in province order.
    pub fn dislodged_units(&self) -> impl Iterator<Item = &DislodgedUnit> + '_ {
        self.dislodged.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIE: ProvinceId = ProvinceId(0);
    const BUD: ProvinceId = ProvinceId(1);
    const AUSTRIA: PowerId = PowerId(0);
    const RUSSIA: PowerId = PowerId(1);

    #[test]
    fn empty_state_has_no_units() {
        let state = BoardState::with_capacity(4);
        assert_eq!(state.province_count(), 4);
        assert_eq!(state.unit_count(), 0);
        assert!(state.dislodged_units().next().is_none());
    }

    #[test]
    fn place_unit_works() {
        let mut state = BoardState::with_capacity(4);
        assert!(state.place_unit(VIE, AUSTRIA, UnitKind::Army));
        let unit = state.unit_at(VIE).unwrap();
        assert_eq!(unit.power, AUSTRIA);
        assert_eq!(unit.province, VIE);
        assert!(state.unit_at(BUD).is_none());
    }

    #[test]
    fn place_unit_rejects_duplicate_and_out_of_range() {
        let mut state = BoardState::with_capacity(2);
        assert!(state.place_unit(VIE, AUSTRIA, UnitKind::Army));
        assert!(!state.place_unit(VIE, RUSSIA, UnitKind::Army));
        assert!(!state.place_unit(ProvinceId(7), RUSSIA, UnitKind::Fleet));
    }

    #[test]
    fn set_dislodged_records_attacker() {
        let mut state = BoardState::with_capacity(2);
        state.set_dislodged(DislodgedUnit {
            power: AUSTRIA,
            kind: UnitKind::Army,
            province: BUD,
            attacker_from: VIE,
        });
        let d = state.dislodged[BUD.index()].unwrap();
        assert_eq!(d.power, AUSTRIA);
        assert_eq!(d.attacker_from, VIE);
    }
}
