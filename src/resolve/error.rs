//! Adjudicator errors and the iteration ceiling of the fixed-point loops.

use std::fmt;

use thiserror::Error;
use tracing::error;

/// The fixed-point loops of the adjudicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ConvoyEndangerment,
    Bounce,
    DislodgementCuts,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ConvoyEndangerment => "convoy endangerment",
            Stage::Bounce => "bounce",
            Stage::DislodgementCuts => "dislodgement cuts",
        };
        f.write_str(name)
    }
}

/// Errors returned by `adjudicate`.
///
/// The first group rejects input that breaks the adjudicator's contract.
/// Illegal orders are never errors; they are marked and resolve as holds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdjudicationError {
    #[error("board state covers {state} provinces but the map has {map}")]
    MapMismatch { state: usize, map: usize },

    #[error("order names province #{0}, which is not on the map")]
    UnknownProvince(u16),

    #[error("order for '{0}', where there is no unit")]
    NoUnit(String),

    #[error("order for {found:?} at '{province}' but the unit there is {actual:?}")]
    UnitKindMismatch {
        province: String,
        found: crate::board::UnitKind,
        actual: crate::board::UnitKind,
    },

    #[error("more than one order for the unit at '{0}'")]
    DuplicateOrder(String),

    #[error("alliance names unknown power '{0}'")]
    UnknownAlliancePower(String),

    #[error("{stage} loop did not settle within {limit} passes")]
    IterationLimit { stage: Stage, limit: usize },

    #[error("two units finished the turn in '{0}'")]
    OccupancyConflict(String),
}

/// Counts passes of one fixed-point loop against its ceiling.
#[derive(Debug)]
pub(crate) struct PassBudget {
    stage: Stage,
    limit: usize,
    used: usize,
}

impl PassBudget {
    /// A budget of `ceiling + slack` passes.
    pub(crate) fn new(stage: Stage, ceiling: usize, slack: usize) -> Self {
        PassBudget {
            stage,
            limit: ceiling.saturating_add(slack).max(1),
            used: 0,
        }
    }

    /// Consumes one pass, failing once the ceiling is exceeded.
    pub(crate) fn tick(&mut self) -> Result<(), AdjudicationError> {
        self.used += 1;
        if self.used > self.limit {
            error!(stage = %self.stage, limit = self.limit, "fixed point not reached");
            return Err(AdjudicationError::IterationLimit {
                stage: self.stage,
                limit: self.limit,
            });
        }
        Ok(())
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_allows_ceiling_plus_slack() {
        let mut budget = PassBudget::new(Stage::Bounce, 2, 1);
        for _ in 0..3 {
            budget.tick().unwrap();
        }
        assert_eq!(
            budget.tick(),
            Err(AdjudicationError::IterationLimit {
                stage: Stage::Bounce,
                limit: 3
            })
        );
        assert_eq!(budget.used(), 4);
    }

    #[test]
    fn empty_loop_still_gets_one_pass() {
        let mut budget = PassBudget::new(Stage::DislodgementCuts, 0, 0);
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_err());
    }

    #[test]
    fn error_messages_name_the_stage() {
        let e = AdjudicationError::IterationLimit {
            stage: Stage::ConvoyEndangerment,
            limit: 5,
        };
        assert_eq!(e.to_string(), "convoy endangerment loop did not settle within 5 passes");
    }
}
