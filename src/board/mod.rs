//! Board representation and turn-state types.
//!
//! Contains the province graph, units, orders, and the board snapshot a
//! turn is adjudicated against.

pub mod map;
pub mod order;
pub mod state;
pub mod unit;

pub use map::{AdjacencyEntry, Map, MapBuilder, MapError, PowerId, ProvinceId, ProvinceInfo, Terrain};
pub use order::{Order, OrderUnit};
pub use state::{BoardState, DislodgedUnit};
pub use unit::{Unit, UnitKind};
