//! Ruleset options for adjudication.
//!
//! `Rules` is read from the `rules` section of a turn document and is
//! read-only for the turn. Every field has a default, so an absent section
//! means the standard rules.

use serde::{Deserialize, Serialize};

/// Which units a mover is forbidden to dislodge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfDislodge {
    /// A unit may not dislodge a unit of its own power.
    #[default]
    SamePower,
    /// A unit may not dislodge a unit of its own power or of an allied power.
    SameAlliance,
}

/// Adjudication options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub self_dislodge: SelfDislodge,
    /// Groups of power names that count as one side under
    /// `SelfDislodge::SameAlliance`.
    pub alliances: Vec<Vec<String>>,
    /// Extra passes each fixed-point loop may take above its unit-count
    /// ceiling before the adjudicator gives up.
    pub pass_limit_slack: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            self_dislodge: SelfDislodge::SamePower,
            alliances: Vec::new(),
            pass_limit_slack: 1,
        }
    }
}

impl Rules {
    /// Standard rules with the alliance variant of self-dislodgement.
    pub fn with_alliances(alliances: Vec<Vec<String>>) -> Self {
        Rules {
            self_dislodge: SelfDislodge::SameAlliance,
            alliances,
            ..Rules::default()
        }
    }
}
