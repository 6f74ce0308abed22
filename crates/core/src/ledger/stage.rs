//! Stage machine shared by royalty and rebate entries.
//!
//! Both ledgers move entries through the same three stages:
//! - Open → Confirmed (royalty approved, rebate validated)
//! - Confirmed → Settled (paid)
//!
//! Transitions are monotonic and `Settled` is terminal. `Cancelled` is a side
//! exit reachable from any non-terminal stage. A jump from `Open` straight to
//! `Settled` is tolerated but reported by [`LedgerStage::skips_stage`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract stage of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStage {
    /// Recorded, not yet confirmed.
    Open,
    /// Confirmed and owed.
    Confirmed,
    /// Paid out.
    Settled,
    /// Withdrawn before settlement.
    Cancelled,
}

impl LedgerStage {
    /// Position along the main path; `None` for the side exit.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Open => Some(0),
            Self::Confirmed => Some(1),
            Self::Settled => Some(2),
            Self::Cancelled => None,
        }
    }

    /// Returns true if no transition leaves this stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }

    /// Returns true if `from → to` moves strictly forward.
    #[must_use]
    pub const fn is_forward(from: Self, to: Self) -> bool {
        if from.is_terminal() {
            return false;
        }
        match (from.rank(), to.rank()) {
            (Some(a), Some(b)) => b > a,
            (_, None) => true,
            (None, Some(_)) => false,
        }
    }

    /// Returns true if `from → to` jumps over the confirmation stage.
    #[must_use]
    pub const fn skips_stage(from: Self, to: Self) -> bool {
        matches!((from, to), (Self::Open, Self::Settled))
    }
}

impl fmt::Display for LedgerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Confirmed => "confirmed",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Anything placed on the shared stage machine.
pub trait Staged {
    /// Current stage.
    fn stage(&self) -> LedgerStage;
}
