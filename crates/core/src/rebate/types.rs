//! Rebate domain types.

use chrono::{DateTime, Utc};
use folio_shared::Money;
use folio_shared::types::{OrderId, PartnerId, RebateId, WorkId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::{LedgerStage, Staged};
use crate::rebate::error::RebateError;

/// Rebate lifecycle status.
///
/// The legacy literal `PENDING` is read as `Accrued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebateStatus {
    /// Recorded on an order, awaiting validation.
    #[serde(alias = "PENDING")]
    Accrued,
    /// Validated, counts toward the withdrawable balance.
    Validated,
    /// Paid out (terminal).
    Paid,
    /// Cancelled before payment (terminal).
    Cancelled,
}

impl RebateStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accrued => "ACCRUED",
            Self::Validated => "VALIDATED",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Maps the status onto the shared stage machine.
    #[must_use]
    pub const fn stage(self) -> LedgerStage {
        match self {
            Self::Accrued => LedgerStage::Open,
            Self::Validated => LedgerStage::Confirmed,
            Self::Paid => LedgerStage::Settled,
            Self::Cancelled => LedgerStage::Cancelled,
        }
    }
}

impl fmt::Display for RebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebateStatus {
    type Err = RebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCRUED" | "PENDING" => Ok(Self::Accrued),
            "VALIDATED" => Ok(Self::Validated),
            "PAID" => Ok(Self::Paid),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(RebateError::UnknownStatus(other.to_string())),
        }
    }
}

/// One rebate owed to a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateEntry {
    /// Entry id.
    pub id: RebateId,
    /// Partner owed the rebate.
    pub partner_id: PartnerId,
    /// Originating order.
    pub order_id: Option<OrderId>,
    /// Work sold.
    pub work_id: Option<WorkId>,
    /// Amount owed.
    pub amount: Money,
    /// Percentage applied.
    pub rate: Decimal,
    /// Lifecycle status.
    pub status: RebateStatus,
    /// Validation time.
    pub validated_at: Option<DateTime<Utc>>,
    /// Payment time.
    pub paid_at: Option<DateTime<Utc>>,
}

impl RebateEntry {
    /// Creates an accrued entry.
    #[must_use]
    pub fn accrued(partner_id: PartnerId, amount: Money, rate: Decimal) -> Self {
        Self {
            id: RebateId::new(),
            partner_id,
            order_id: None,
            work_id: None,
            amount,
            rate,
            status: RebateStatus::Accrued,
            validated_at: None,
            paid_at: None,
        }
    }

    /// Returns the entry with `status` set.
    #[must_use]
    pub fn with_status(mut self, status: RebateStatus) -> Self {
        self.status = status;
        self
    }
}

impl Staged for RebateEntry {
    fn stage(&self) -> LedgerStage {
        self.status.stage()
    }
}
