//! JSON turn documents.
//!
//! A `TurnDocument` carries everything one adjudication needs: the map, the
//! rules, the unit placement and the orders. Provinces and powers are named
//! by abbreviation and name; units in orders are written `"A lon"` or
//! `"F nth"`. A `ResultDocument` is the matching output.
//!
//! ```json
//! {
//!   "map": { "powers": ["England"], "provinces": [...], "adjacencies": [...] },
//!   "units": [{ "power": "England", "kind": "fleet", "province": "nth" }],
//!   "orders": [{ "type": "move", "unit": "F nth", "to": "nwy" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::{
    BoardState, DislodgedUnit, Map, MapError, Order, OrderUnit, ProvinceId, Terrain, UnitKind,
};
use crate::resolve::{adjudicate, Adjudication, AdjudicationError, Outcome};
use crate::rules::Rules;

/// Errors that can occur while loading a turn document.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("unknown power '{0}'")]
    UnknownPower(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("invalid unit reference '{0}', expected e.g. 'A lon' or 'F nth'")]
    InvalidUnit(String),

    #[error("duplicate unit at province '{0}'")]
    DuplicateUnit(String),
}

/// A map description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    pub powers: Vec<String>,
    pub provinces: Vec<ProvinceEntry>,
    #[serde(default)]
    pub adjacencies: Vec<AdjacencyInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceEntry {
    pub abbr: String,
    #[serde(default)]
    pub name: String,
    pub terrain: Terrain,
    #[serde(default)]
    pub supply_center: bool,
}

/// One adjacency, declared once per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyInput {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub army: bool,
    #[serde(default)]
    pub fleet: bool,
}

impl MapDocument {
    /// Builds and validates the map.
    pub fn build(&self) -> Result<Map, TurnError> {
        let mut b = Map::builder();
        for power in &self.powers {
            b.power(power);
        }
        for p in &self.provinces {
            let name = if p.name.is_empty() { &p.abbr } else { &p.name };
            b.province(&p.abbr, name, p.terrain, p.supply_center);
        }
        let id = |abbr: &str| -> Result<ProvinceId, TurnError> {
            self.provinces
                .iter()
                .position(|p| p.abbr == abbr)
                .map(|i| ProvinceId(i as u16))
                .ok_or_else(|| MapError::UnknownProvince(abbr.to_string()).into())
        };
        for adj in &self.adjacencies {
            b.edge(id(&adj.from)?, id(&adj.to)?, adj.army, adj.fleet);
        }
        Ok(b.build()?)
    }
}

/// A unit placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub power: String,
    pub kind: UnitKind,
    pub province: String,
}

/// A structural order. `unit` and `supported` are unit references such as
/// `"A lon"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEntry {
    Hold {
        unit: String,
    },
    Move {
        unit: String,
        to: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        via: Vec<String>,
    },
    SupportHold {
        unit: String,
        supported: String,
    },
    SupportMove {
        unit: String,
        supported: String,
        to: String,
    },
    Convoy {
        unit: String,
        from: String,
        to: String,
    },
}

fn province(map: &Map, abbr: &str) -> Result<ProvinceId, TurnError> {
    map.province_id(abbr)
        .ok_or_else(|| TurnError::UnknownProvince(abbr.to_string()))
}

fn parse_unit(map: &Map, s: &str) -> Result<OrderUnit, TurnError> {
    let invalid = || TurnError::InvalidUnit(s.to_string());
    let (kind, at) = s.trim().split_once(' ').ok_or_else(invalid)?;
    let mut chars = kind.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => UnitKind::from_abbr_char(c).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok(OrderUnit {
        kind,
        location: province(map, at.trim())?,
    })
}

fn format_unit(map: &Map, unit: OrderUnit) -> String {
    format!("{} {}", unit.kind.abbr_char(), map.abbr(unit.location))
}

impl OrderEntry {
    /// Resolves names against `map`.
    pub fn to_order(&self, map: &Map) -> Result<Order, TurnError> {
        Ok(match self {
            OrderEntry::Hold { unit } => Order::hold(parse_unit(map, unit)?),
            OrderEntry::Move { unit, to, via } => Order::Move {
                unit: parse_unit(map, unit)?,
                dest: province(map, to)?,
                via: via
                    .iter()
                    .map(|sea| province(map, sea))
                    .collect::<Result<_, _>>()?,
            },
            OrderEntry::SupportHold { unit, supported } => Order::SupportHold {
                unit: parse_unit(map, unit)?,
                supported: parse_unit(map, supported)?,
            },
            OrderEntry::SupportMove { unit, supported, to } => Order::SupportMove {
                unit: parse_unit(map, unit)?,
                supported: parse_unit(map, supported)?,
                dest: province(map, to)?,
            },
            OrderEntry::Convoy { unit, from, to } => Order::Convoy {
                unit: parse_unit(map, unit)?,
                convoyed_from: province(map, from)?,
                convoyed_to: province(map, to)?,
            },
        })
    }

    /// Names an order's units and provinces by abbreviation.
    pub fn from_order(map: &Map, order: &Order) -> Self {
        let abbr = |p: ProvinceId| map.abbr(p).to_string();
        match order {
            Order::Hold { unit } => OrderEntry::Hold {
                unit: format_unit(map, *unit),
            },
            Order::Move { unit, dest, via } => OrderEntry::Move {
                unit: format_unit(map, *unit),
                to: abbr(*dest),
                via: via.iter().map(|&p| abbr(p)).collect(),
            },
            Order::SupportHold { unit, supported } => OrderEntry::SupportHold {
                unit: format_unit(map, *unit),
                supported: format_unit(map, *supported),
            },
            Order::SupportMove {
                unit,
                supported,
                dest,
            } => OrderEntry::SupportMove {
                unit: format_unit(map, *unit),
                supported: format_unit(map, *supported),
                to: abbr(*dest),
            },
            Order::Convoy {
                unit,
                convoyed_from,
                convoyed_to,
            } => OrderEntry::Convoy {
                unit: format_unit(map, *unit),
                from: abbr(*convoyed_from),
                to: abbr(*convoyed_to),
            },
        }
    }
}

/// A complete turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnDocument {
    pub map: MapDocument,
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
}

/// A turn document resolved into typed values.
#[derive(Debug, Clone)]
pub struct LoadedTurn {
    pub map: Map,
    pub rules: Rules,
    pub state: BoardState,
    pub orders: Vec<Order>,
}

impl LoadedTurn {
    pub fn adjudicate(&self) -> Result<Adjudication, AdjudicationError> {
        adjudicate(&self.map, &self.state, &self.orders, &self.rules)
    }
}

impl TurnDocument {
    /// Builds the map and resolves every name in the document.
    ///
    /// Order legality is not checked here; the adjudicator marks illegal
    /// orders itself.
    pub fn load(self) -> Result<LoadedTurn, TurnError> {
        let map = self.map.build()?;
        let mut state = BoardState::empty(&map);
        for u in &self.units {
            let power = map
                .power_id(&u.power)
                .ok_or_else(|| TurnError::UnknownPower(u.power.clone()))?;
            let at = province(&map, &u.province)?;
            if !state.place_unit(at, power, u.kind) {
                return Err(TurnError::DuplicateUnit(u.province.clone()));
            }
        }
        let orders = self
            .orders
            .iter()
            .map(|o| o.to_order(&map))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            provinces = map.province_count(),
            units = state.unit_count(),
            orders = orders.len(),
            "turn loaded"
        );
        Ok(LoadedTurn {
            map,
            rules: self.rules,
            state,
            orders,
        })
    }
}

/// Parses and loads a turn document.
pub fn load_turn(json: &str) -> Result<LoadedTurn, TurnError> {
    let doc: TurnDocument = serde_json::from_str(json)?;
    doc.load()
}

/// Parses a map document and builds the map.
pub fn load_map(json: &str) -> Result<Map, TurnError> {
    let doc: MapDocument = serde_json::from_str(json)?;
    doc.build()
}

/// A dislodged unit, named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DislodgedEntry {
    pub power: String,
    pub kind: UnitKind,
    pub province: String,
    pub attacker_from: String,
}

/// The outcome of one unit's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResultEntry {
    pub power: String,
    pub order: OrderEntry,
    pub outcome: Outcome,
}

/// The output of one adjudication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub units: Vec<UnitEntry>,
    pub dislodged: Vec<DislodgedEntry>,
    pub orders: Vec<OrderResultEntry>,
}

fn dislodged_entry(map: &Map, d: &DislodgedUnit) -> DislodgedEntry {
    DislodgedEntry {
        power: map.power_name(d.power).to_string(),
        kind: d.kind,
        province: map.abbr(d.province).to_string(),
        attacker_from: map.abbr(d.attacker_from).to_string(),
    }
}

/// Names every unit and order of an adjudication.
pub fn render_result(map: &Map, adj: &Adjudication) -> ResultDocument {
    ResultDocument {
        units: adj
            .state
            .units()
            .map(|u| UnitEntry {
                power: map.power_name(u.power).to_string(),
                kind: u.kind,
                province: map.abbr(u.province).to_string(),
            })
            .collect(),
        dislodged: adj.dislodged.iter().map(|d| dislodged_entry(map, d)).collect(),
        orders: adj
            .results
            .iter()
            .map(|r| OrderResultEntry {
                power: map.power_name(r.power).to_string(),
                order: OrderEntry::from_order(map, &r.order),
                outcome: r.outcome,
            })
            .collect(),
    }
}
