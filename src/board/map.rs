//! Province graph for a Diplomacy-style map.
//!
//! A `Map` owns the province table, the directed adjacency list and the
//! power names. It is built once by a map loader (see `MapBuilder` and
//! `protocol::turn::MapDocument`) and is read-only for every turn that is
//! adjudicated against it.
//!
//! Adjacencies carry separate army and fleet passability flags, so a
//! coastal pair such as Rome-Venice can be army-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::unit::UnitKind;

/// Index of a province in its map's province table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProvinceId(pub u16);

impl ProvinceId {
    /// Returns the id as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a power in its map's power table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PowerId(pub u8);

impl PowerId {
    /// Returns the id as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Classifies a province by terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Land,
    Sea,
    Coastal,
}

/// Static metadata for one province.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceInfo {
    pub abbr: String,
    pub name: String,
    pub terrain: Terrain,
    pub is_supply_center: bool,
}

/// A single directed adjacency between two provinces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyEntry {
    pub from: ProvinceId,
    pub to: ProvinceId,
    pub army_ok: bool,
    pub fleet_ok: bool,
}

/// Errors raised while assembling a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("duplicate province abbreviation '{0}'")]
    DuplicateProvince(String),

    #[error("duplicate power '{0}'")]
    DuplicatePower(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("province '{0}' cannot be adjacent to itself")]
    SelfAdjacency(String),

    #[error("adjacency {from}-{to} allows neither armies nor fleets")]
    ImpassableEdge { from: String, to: String },

    #[error("adjacency {from}-{to} lets {kind} units cross terrain they cannot enter")]
    TerrainMismatch {
        from: String,
        to: String,
        kind: &'static str,
    },

    #[error("map has {0} provinces, more than a map can index")]
    TooManyProvinces(usize),

    #[error("map has {0} powers, more than a map can index")]
    TooManyPowers(usize),
}

/// The province graph shared by every turn of a game.
#[derive(Debug, Clone)]
pub struct Map {
    provinces: Vec<ProvinceInfo>,
    powers: Vec<String>,
    /// Outgoing edges per province, sorted by destination.
    adjacency: Vec<Vec<AdjacencyEntry>>,
    abbr_index: HashMap<String, ProvinceId>,
}

impl Map {
    /// Starts building a new map.
    pub fn builder() -> MapBuilder {
        MapBuilder::default()
    }

    /// Returns the number of provinces.
    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    /// Returns true if `id` names a province of this map.
    pub fn contains(&self, id: ProvinceId) -> bool {
        id.index() < self.provinces.len()
    }

    /// Iterates over all province ids in index order.
    pub fn province_ids(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        (0..self.provinces.len()).map(|i| ProvinceId(i as u16))
    }

    /// Returns the metadata for a province.
    ///
    /// Panics if `id` does not belong to this map.
    pub fn info(&self, id: ProvinceId) -> &ProvinceInfo {
        &self.provinces[id.index()]
    }

    /// Returns the terrain of a province.
    pub fn terrain(&self, id: ProvinceId) -> Terrain {
        self.info(id).terrain
    }

    /// Returns the abbreviation of a province, or `"?"` for a foreign id.
    pub fn abbr(&self, id: ProvinceId) -> &str {
        self.provinces
            .get(id.index())
            .map(|p| p.abbr.as_str())
            .unwrap_or("?")
    }

    /// Looks up a province by its abbreviation.
    pub fn province_id(&self, abbr: &str) -> Option<ProvinceId> {
        self.abbr_index.get(abbr).copied()
    }

    /// Returns the power names in index order.
    pub fn powers(&self) -> &[String] {
        &self.powers
    }

    /// Looks up a power by name.
    pub fn power_id(&self, name: &str) -> Option<PowerId> {
        self.powers
            .iter()
            .position(|p| p == name)
            .map(|i| PowerId(i as u8))
    }

    /// Returns the name of a power, or `"?"` for a foreign id.
    pub fn power_name(&self, id: PowerId) -> &str {
        self.powers.get(id.index()).map(String::as_str).unwrap_or("?")
    }

    /// Returns all outgoing adjacency entries of a province.
    pub fn adj_from(&self, id: ProvinceId) -> &[AdjacencyEntry] {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if a unit of `kind` can move directly from `from` to `to`.
    pub fn is_adjacent(&self, from: ProvinceId, to: ProvinceId, kind: UnitKind) -> bool {
        let edges = self.adj_from(from);
        match edges.binary_search_by_key(&to, |e| e.to) {
            Ok(i) => match kind {
                UnitKind::Army => edges[i].army_ok,
                UnitKind::Fleet => edges[i].fleet_ok,
            },
            Err(_) => false,
        }
    }

    /// Returns the provinces a unit of `kind` can move to from `from`.
    pub fn neighbours(&self, from: ProvinceId, kind: UnitKind) -> Vec<ProvinceId> {
        self.adj_from(from)
            .iter()
            .filter(|e| match kind {
                UnitKind::Army => e.army_ok,
                UnitKind::Fleet => e.fleet_ok,
            })
            .map(|e| e.to)
            .collect()
    }
}

/// Incremental constructor for a `Map`.
///
/// Provinces and powers receive ids in insertion order. Each adjacency is
/// declared once and mirrored into both directions; declaring the same pair
/// twice merges the passability flags.
#[derive(Debug, Default)]
pub struct MapBuilder {
    provinces: Vec<ProvinceInfo>,
    powers: Vec<String>,
    edges: Vec<(ProvinceId, ProvinceId, bool, bool)>,
}

impl MapBuilder {
    /// Adds a power and returns its id.
    pub fn power(&mut self, name: &str) -> PowerId {
        self.powers.push(name.to_string());
        PowerId((self.powers.len() - 1) as u8)
    }

    /// Adds a province and returns its id.
    pub fn province(
        &mut self,
        abbr: &str,
        name: &str,
        terrain: Terrain,
        is_supply_center: bool,
    ) -> ProvinceId {
        self.provinces.push(ProvinceInfo {
            abbr: abbr.to_string(),
            name: name.to_string(),
            terrain,
            is_supply_center,
        });
        ProvinceId((self.provinces.len() - 1) as u16)
    }

    /// Declares an adjacency passable by armies only.
    pub fn army(&mut self, a: ProvinceId, b: ProvinceId) -> &mut Self {
        self.edge(a, b, true, false)
    }

    /// Declares an adjacency passable by fleets only.
    pub fn fleet(&mut self, a: ProvinceId, b: ProvinceId) -> &mut Self {
        self.edge(a, b, false, true)
    }

    /// Declares an adjacency passable by both armies and fleets.
    pub fn both(&mut self, a: ProvinceId, b: ProvinceId) -> &mut Self {
        self.edge(a, b, true, true)
    }

    /// Declares an adjacency with explicit passability flags.
    pub fn edge(&mut self, a: ProvinceId, b: ProvinceId, army_ok: bool, fleet_ok: bool) -> &mut Self {
        self.edges.push((a, b, army_ok, fleet_ok));
        self
    }

    /// Validates the declarations and produces the map.
    pub fn build(self) -> Result<Map, MapError> {
        if self.provinces.len() > u16::MAX as usize {
            return Err(MapError::TooManyProvinces(self.provinces.len()));
        }
        if self.powers.len() > u8::MAX as usize {
            return Err(MapError::TooManyPowers(self.powers.len()));
        }

        let mut abbr_index = HashMap::with_capacity(self.provinces.len());
        for (i, p) in self.provinces.iter().enumerate() {
            if abbr_index.insert(p.abbr.clone(), ProvinceId(i as u16)).is_some() {
                return Err(MapError::DuplicateProvince(p.abbr.clone()));
            }
        }
        for (i, name) in self.powers.iter().enumerate() {
            if self.powers[..i].contains(name) {
                return Err(MapError::DuplicatePower(name.clone()));
            }
        }

        let abbr = |id: ProvinceId| -> Result<String, MapError> {
            self.provinces
                .get(id.index())
                .map(|p| p.abbr.clone())
                .ok_or_else(|| MapError::UnknownProvince(format!("#{}", id.0)))
        };

        let mut adjacency: Vec<Vec<AdjacencyEntry>> = vec![Vec::new(); self.provinces.len()];
        for &(a, b, army_ok, fleet_ok) in &self.edges {
            let (a_abbr, b_abbr) = (abbr(a)?, abbr(b)?);
            if a == b {
                return Err(MapError::SelfAdjacency(a_abbr));
            }
            if !army_ok && !fleet_ok {
                return Err(MapError::ImpassableEdge { from: a_abbr, to: b_abbr });
            }
            let (ta, tb) = (self.provinces[a.index()].terrain, self.provinces[b.index()].terrain);
            if army_ok && (ta == Terrain::Sea || tb == Terrain::Sea) {
                return Err(MapError::TerrainMismatch { from: a_abbr, to: b_abbr, kind: "army" });
            }
            if fleet_ok && (ta == Terrain::Land || tb == Terrain::Land) {
                return Err(MapError::TerrainMismatch { from: a_abbr, to: b_abbr, kind: "fleet" });
            }
            insert_edge(&mut adjacency[a.index()], a, b, army_ok, fleet_ok);
            insert_edge(&mut adjacency[b.index()], b, a, army_ok, fleet_ok);
        }

        Ok(Map {
            provinces: self.provinces,
            powers: self.powers,
            adjacency,
            abbr_index,
        })
    }
}

/// Inserts or merges a directed edge, keeping the list sorted by destination.
fn insert_edge(edges: &mut Vec<AdjacencyEntry>, from: ProvinceId, to: ProvinceId, army_ok: bool, fleet_ok: bool) {
    match edges.binary_search_by_key(&to, |e| e.to) {
        Ok(i) => {
            edges[i].army_ok |= army_ok;
            edges[i].fleet_ok |= fleet_ok;
        }
        Err(i) => edges.insert(
            i,
            AdjacencyEntry {
                from,
                to,
                army_ok,
                fleet_ok,
            },
        ),
    }
}
