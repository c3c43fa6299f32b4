//! External document formats.
//!
//! The adjudicator never parses text itself. This module converts the JSON
//! turn documents read by the `judge` binary into typed boards and orders,
//! and renders adjudication results back into JSON.

pub mod turn;

pub use turn::{
    load_map, load_turn, render_result, LoadedTurn, MapDocument, OrderEntry, ResultDocument,
    TurnDocument, TurnError,
};
