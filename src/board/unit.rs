//! Unit types and ownership.
//!
//! Represents armies and fleets, their owning power, and their current
//! province on the board.

use serde::{Deserialize, Serialize};

use super::map::{PowerId, ProvinceId};

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Army,
    Fleet,
}

impl UnitKind {
    /// Returns the uppercase abbreviation used in order notation.
    pub const fn abbr_char(self) -> char {
        match self {
            UnitKind::Army => 'A',
            UnitKind::Fleet => 'F',
        }
    }

    /// Parses a unit kind from its uppercase abbreviation.
    pub fn from_abbr_char(c: char) -> Option<UnitKind> {
        match c {
            'A' => Some(UnitKind::Army),
            'F' => Some(UnitKind::Fleet),
            _ => None,
        }
    }
}

/// A military unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub power: PowerId,
    pub kind: UnitKind,
    pub province: ProvinceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_kind_abbr_roundtrip() {
        assert_eq!(UnitKind::from_abbr_char('A'), Some(UnitKind::Army));
        assert_eq!(UnitKind::from_abbr_char('F'), Some(UnitKind::Fleet));
        assert_eq!(UnitKind::from_abbr_char('x'), None);
        assert_eq!(UnitKind::Fleet.abbr_char(), 'F');
    }
}
