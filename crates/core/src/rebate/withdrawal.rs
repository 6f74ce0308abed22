//! Partner withdrawal requests.

use folio_shared::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rebate::error::RebateError;

/// Withdrawal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WithdrawalStatus {
    /// Requested, awaiting review.
    Pending,
    /// Approved, awaiting payout.
    Approved,
    /// Paid out.
    Paid,
    /// Refused.
    Rejected,
}

impl WithdrawalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status filter.
    ///
    /// # Errors
    ///
    /// Returns `RebateError::UnknownWithdrawalStatus` for any other literal.
    pub fn parse(s: &str) -> Result<Self, RebateError> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "PAID" => Ok(Self::Paid),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(RebateError::UnknownWithdrawalStatus(other.to_string())),
        }
    }

    /// Returns true while the request still reserves balance.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Withdrawal counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WithdrawalStats {
    /// Awaiting review.
    pub pending: usize,
    /// Approved, not paid yet.
    pub approved: usize,
    /// Paid out.
    pub paid: usize,
    /// Refused.
    pub rejected: usize,
}

impl WithdrawalStats {
    /// Counts `statuses`.
    #[must_use]
    pub fn tally<I: IntoIterator<Item = WithdrawalStatus>>(statuses: I) -> Self {
        statuses.into_iter().fold(Self::default(), |mut stats, status| {
            match status {
                WithdrawalStatus::Pending => stats.pending += 1,
                WithdrawalStatus::Approved => stats.approved += 1,
                WithdrawalStatus::Paid => stats.paid += 1,
                WithdrawalStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

/// A PDG decision on a withdrawal.
///
/// - Pending → Approved (`Approve`)
/// - Pending → Rejected (`Reject`, reason required)
/// - Approved → Paid (`MarkPaid`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalAction {
    /// Accepts a pending request.
    Approve,
    /// Refuses a pending request.
    Reject,
    /// Records the payout of an approved request.
    MarkPaid,
}

impl WithdrawalAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::MarkPaid => "MARK_PAID",
        }
    }

    /// Status the withdrawal must be in.
    #[must_use]
    pub const fn source(self) -> WithdrawalStatus {
        match self {
            Self::Approve | Self::Reject => WithdrawalStatus::Pending,
            Self::MarkPaid => WithdrawalStatus::Approved,
        }
    }

    /// Status written by the action.
    #[must_use]
    pub const fn target(self) -> WithdrawalStatus {
        match self {
            Self::Approve => WithdrawalStatus::Approved,
            Self::Reject => WithdrawalStatus::Rejected,
            Self::MarkPaid => WithdrawalStatus::Paid,
        }
    }

    /// Checks the action against the current status.
    ///
    /// # Errors
    ///
    /// * `RebateError::WithdrawalNotReviewable` if `current` is not the source
    /// * `RebateError::RejectionReasonRequired` for a rejection without reason
    pub fn review(
        self,
        current: WithdrawalStatus,
        rejection_reason: Option<&str>,
    ) -> Result<WithdrawalStatus, RebateError> {
        if current != self.source() {
            return Err(RebateError::WithdrawalNotReviewable {
                action: self,
                status: current,
            });
        }
        if self == Self::Reject && rejection_reason.is_none_or(|r| r.trim().is_empty()) {
            return Err(RebateError::RejectionReasonRequired);
        }
        Ok(self.target())
    }
}

impl fmt::Display for WithdrawalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WithdrawalMethod {
    /// Mobile money transfer.
    #[default]
    Momo,
    /// Bank transfer.
    Bank,
    /// Cash at the office.
    Cash,
}

impl WithdrawalMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Momo => "MOMO",
            Self::Bank => "BANK",
            Self::Cash => "CASH",
        }
    }
}

/// Withdrawal admission rules.
#[derive(Debug, Clone, Copy)]
pub struct WithdrawalPolicy {
    /// Smallest amount accepted.
    pub minimum: Money,
}

impl WithdrawalPolicy {
    /// Creates a policy with the configured minimum.
    #[must_use]
    pub const fn new(minimum: Money) -> Self {
        Self { minimum }
    }

    /// Balance still withdrawable once outstanding requests are reserved.
    #[must_use]
    pub fn withdrawable(available: Money, outstanding: Money) -> Money {
        available.remaining_after(outstanding)
    }

    /// Checks a request against the available balance and outstanding requests.
    ///
    /// # Errors
    ///
    /// * `RebateError::InvalidAmount` if `amount <= 0`
    /// * `RebateError::BelowMinimum` if `amount` is under the minimum
    /// * `RebateError::InsufficientBalance` if `amount` exceeds what is left
    pub fn check(
        &self,
        amount: Money,
        available: Money,
        outstanding: Money,
    ) -> Result<(), RebateError> {
        if amount.fcfa() <= 0 {
            return Err(RebateError::InvalidAmount(amount));
        }
        if amount < self.minimum {
            return Err(RebateError::BelowMinimum {
                minimum: self.minimum,
                requested: amount,
            });
        }
        let available = Self::withdrawable(available, outstanding);
        if amount > available {
            return Err(RebateError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        Ok(())
    }
}
