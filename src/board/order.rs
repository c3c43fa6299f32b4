//! Movement-phase orders.
//!
//! Represents the orders a unit can be given during a movement turn: hold,
//! move (directly or by a stated convoy route), support and convoy. Every
//! variant names the unit it belongs to, so an order set is a plain list.

use super::map::ProvinceId;
use super::unit::UnitKind;

/// A unit reference in an order: the unit type and its current province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderUnit {
    pub kind: UnitKind,
    pub location: ProvinceId,
}

impl OrderUnit {
    /// Creates a reference to an army.
    pub const fn army(location: ProvinceId) -> Self {
        Self { kind: UnitKind::Army, location }
    }

    /// Creates a reference to a fleet.
    pub const fn fleet(location: ProvinceId) -> Self {
        Self { kind: UnitKind::Fleet, location }
    }
}

/// A movement-phase order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Order {
    /// Hold: `A vie H`
    Hold { unit: OrderUnit },

    /// Move: `A bud - rum`. A non-empty `via` is the convoy route the army
    /// states for itself: `A lon - nth - nwy`.
    Move {
        unit: OrderUnit,
        dest: ProvinceId,
        via: Vec<ProvinceId>,
    },

    /// Support hold: `A tyr S A vie`
    SupportHold { unit: OrderUnit, supported: OrderUnit },

    /// Support move: `A gal S A bud - rum`
    SupportMove {
        unit: OrderUnit,
        supported: OrderUnit,
        dest: ProvinceId,
    },

    /// Convoy: `F mao C A bre - spa`
    Convoy {
        unit: OrderUnit,
        convoyed_from: ProvinceId,
        convoyed_to: ProvinceId,
    },
}

impl Order {
    /// The implicit order of a unit that was given none.
    pub const fn hold(unit: OrderUnit) -> Self {
        Order::Hold { unit }
    }

    /// A direct move.
    pub fn move_to(unit: OrderUnit, dest: ProvinceId) -> Self {
        Order::Move { unit, dest, via: Vec::new() }
    }

    /// A move along a stated convoy route.
    pub fn move_via(unit: OrderUnit, dest: ProvinceId, via: Vec<ProvinceId>) -> Self {
        Order::Move { unit, dest, via }
    }

    /// Returns the unit issuing this order.
    pub fn unit(&self) -> OrderUnit {
        match *self {
            Order::Hold { unit }
            | Order::Move { unit, .. }
            | Order::SupportHold { unit, .. }
            | Order::SupportMove { unit, .. }
            | Order::Convoy { unit, .. } => unit,
        }
    }

    /// Returns the destination of a move order.
    pub fn dest(&self) -> Option<ProvinceId> {
        match *self {
            Order::Move { dest, .. } => Some(dest),
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Order::Move { .. })
    }

    /// Returns true for a move that relies on a convoy route.
    pub fn is_convoyed_move(&self) -> bool {
        matches!(self, Order::Move { via, .. } if !via.is_empty())
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Order::SupportHold { .. } | Order::SupportMove { .. })
    }

    /// Returns the supported unit of a support order.
    pub fn supported(&self) -> Option<OrderUnit> {
        match *self {
            Order::SupportHold { supported, .. } | Order::SupportMove { supported, .. } => {
                Some(supported)
            }
            _ => None,
        }
    }

    /// Returns the province a support order is directed into: the held
    /// unit's province for a support hold, the destination for a support
    /// move.
    pub fn support_target(&self) -> Option<ProvinceId> {
        match *self {
            Order::SupportHold { supported, .. } => Some(supported.location),
            Order::SupportMove { dest, .. } => Some(dest),
            _ => None,
        }
    }

    /// Returns every province this order names.
    pub fn provinces(&self) -> Vec<ProvinceId> {
        match self {
            Order::Hold { unit } => vec![unit.location],
            Order::Move { unit, dest, via } => {
                let mut v = Vec::with_capacity(via.len() + 2);
                v.push(unit.location);
                v.push(*dest);
                v.extend(via.iter().copied());
                v
            }
            Order::SupportHold { unit, supported } => vec![unit.location, supported.location],
            Order::SupportMove { unit, supported, dest } => {
                vec![unit.location, supported.location, *dest]
            }
            Order::Convoy {
                unit,
                convoyed_from,
                convoyed_to,
            } => vec![unit.location, *convoyed_from, *convoyed_to],
        }
    }
}
