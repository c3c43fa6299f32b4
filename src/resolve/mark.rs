//! Order marks and final outcomes.

use serde::{Deserialize, Serialize};

/// The adjudication state of one order.
///
/// Marks only escalate during a turn, with one exception: a support cut by
/// dislodgement reopens `Bounced` moves for another bounce pass. `Void` and
/// `NoConvoy` are terminal: once set, no later stage changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    Unmarked,
    /// Illegal or unmatched order; resolves as a hold.
    Void,
    /// Convoyed move whose convoy failed, or support given to it.
    NoConvoy,
    /// Support cut by an attack.
    Cut,
    /// Convoy route threatened during the current pass.
    ConvoyEndangered,
    /// Convoy route still threatened after an endangerment pass.
    ConvoyUnderAttack,
    /// Move failed; the unit stays in place.
    Bounced,
    /// Unit forced out of its province.
    Dislodged,
}

impl Mark {
    /// Returns true for marks no later stage may change.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Mark::Void | Mark::NoConvoy)
    }

    /// Returns true if a move carrying this mark is still heading for its
    /// destination.
    pub const fn allows_movement(self) -> bool {
        matches!(
            self,
            Mark::Unmarked | Mark::ConvoyEndangered | Mark::ConvoyUnderAttack
        )
    }

    /// Returns true if a support carrying this mark still counts.
    pub const fn support_counts(self) -> bool {
        matches!(self, Mark::Unmarked)
    }
}

/// The final result reported for each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Bounced,
    Void,
    NoConvoy,
    Cut,
    Dislodged,
}

impl From<Mark> for Outcome {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Unmarked | Mark::ConvoyEndangered | Mark::ConvoyUnderAttack => Outcome::Succeeded,
            Mark::Void => Outcome::Void,
            Mark::NoConvoy => Outcome::NoConvoy,
            Mark::Cut => Outcome::Cut,
            Mark::Bounced => Outcome::Bounced,
            Mark::Dislodged => Outcome::Dislodged,
        }
    }
}
