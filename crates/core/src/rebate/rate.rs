//! Applicable rate hierarchy.
//!
//! WORK > AUTHOR (royalties only) > PARTNER (rebates only) > GLOBAL, then the
//! configured default. Within a tier the newest active rate whose window
//! contains `now` wins.

use chrono::{DateTime, Utc};
use folio_shared::types::{PartnerId, RebateRateId, UserId, WorkId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rebate::error::RebateError;

/// Scope of a configured rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateKind {
    /// Applies to one work.
    Work,
    /// Applies to one author's royalties.
    Author,
    /// Applies to one partner's rebates.
    Partner,
    /// Applies to everything.
    Global,
}

impl RateKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Author => "AUTHOR",
            Self::Partner => "PARTNER",
            Self::Global => "GLOBAL",
        }
    }

    /// Parses a submitted kind literal.
    ///
    /// # Errors
    ///
    /// Returns `RebateError::UnknownRateKind` for any other literal.
    pub fn parse(s: &str) -> Result<Self, RebateError> {
        match s {
            "WORK" => Ok(Self::Work),
            "AUTHOR" => Ok(Self::Author),
            "PARTNER" => Ok(Self::Partner),
            "GLOBAL" => Ok(Self::Global),
            other => Err(RebateError::UnknownRateKind(other.to_string())),
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that `rate` is a percentage.
///
/// # Errors
///
/// Returns `RebateError::InvalidRate` outside `0..=100`.
pub fn check_percentage(rate: Decimal) -> Result<Decimal, RebateError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(RebateError::InvalidRate(rate));
    }
    Ok(rate)
}

/// A rate submitted for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDraft {
    /// Scope.
    pub kind: RateKind,
    /// Target work.
    pub work_id: Option<WorkId>,
    /// Target author.
    pub author_id: Option<UserId>,
    /// Target partner.
    pub partner_id: Option<PartnerId>,
    /// Percentage.
    pub rate: Decimal,
    /// Window start.
    pub start_date: Option<DateTime<Utc>>,
    /// Window end.
    pub end_date: Option<DateTime<Utc>>,
}

impl RateDraft {
    /// Checks the percentage and the target the kind requires.
    ///
    /// # Errors
    ///
    /// * `RebateError::InvalidRate` if the rate is not a percentage
    /// * `RebateError::MissingRateTarget` if a scoped kind names no target
    pub fn validate(&self) -> Result<(), RebateError> {
        check_percentage(self.rate)?;
        let targeted = match self.kind {
            RateKind::Work => self.work_id.is_some(),
            RateKind::Author => self.author_id.is_some(),
            RateKind::Partner => self.partner_id.is_some(),
            RateKind::Global => true,
        };
        if !targeted {
            return Err(RebateError::MissingRateTarget(self.kind));
        }
        Ok(())
    }
}

/// A configured rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebateRate {
    /// Rate id.
    pub id: RebateRateId,
    /// Scope.
    pub kind: RateKind,
    /// Target work for `Work` rates.
    pub work_id: Option<WorkId>,
    /// Target author for `Author` rates.
    pub author_id: Option<UserId>,
    /// Target partner for `Partner` rates.
    pub partner_id: Option<PartnerId>,
    /// Percentage.
    pub rate: Decimal,
    /// Active flag.
    pub is_active: bool,
    /// Window start, open if `None`.
    pub start_date: Option<DateTime<Utc>>,
    /// Window end, open if `None`.
    pub end_date: Option<DateTime<Utc>>,
    /// Creation time, newest wins within a tier.
    pub created_at: DateTime<Utc>,
}

impl RebateRate {
    /// Returns true if the rate is active and its window contains `now`.
    #[must_use]
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date.is_none_or(|start| start <= now)
            && self.end_date.is_none_or(|end| end >= now)
    }
}

/// Who receives the amount the rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beneficiary {
    /// Partner rebate.
    Partner(PartnerId),
    /// Author royalty.
    Author(UserId),
}

/// A resolved rate and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    /// Percentage.
    pub rate: Decimal,
    /// Matching rate, `None` for the configured default.
    pub source: Option<(RebateRateId, RateKind)>,
}

/// Resolves rates against the hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct RateResolver {
    default_partner_rate: Decimal,
    default_author_rate: Decimal,
}

impl RateResolver {
    /// Creates a resolver with the configured defaults.
    #[must_use]
    pub const fn new(default_partner_rate: Decimal, default_author_rate: Decimal) -> Self {
        Self {
            default_partner_rate,
            default_author_rate,
        }
    }

    /// Picks the applicable rate for `beneficiary` on `work_id`.
    #[must_use]
    pub fn resolve(
        &self,
        rates: &[RebateRate],
        beneficiary: Beneficiary,
        work_id: Option<WorkId>,
        now: DateTime<Utc>,
    ) -> ResolvedRate {
        let tiers: [(RateKind, &dyn Fn(&RebateRate) -> bool); 4] = [
            (RateKind::Work, &|r: &RebateRate| work_id.is_some() && r.work_id == work_id),
            (RateKind::Author, &|r: &RebateRate| {
                matches!(beneficiary, Beneficiary::Author(a) if r.author_id == Some(a))
            }),
            (RateKind::Partner, &|r: &RebateRate| {
                matches!(beneficiary, Beneficiary::Partner(p) if r.partner_id == Some(p))
            }),
            (RateKind::Global, &|_: &RebateRate| true),
        ];

        for (kind, matches_target) in tiers {
            let newest = rates
                .iter()
                .filter(|r| r.kind == kind && matches_target(r) && r.is_effective(now))
                .max_by_key(|r| r.created_at);
            if let Some(r) = newest {
                return ResolvedRate {
                    rate: r.rate,
                    source: Some((r.id, r.kind)),
                };
            }
        }

        let rate = match beneficiary {
            Beneficiary::Partner(_) => self.default_partner_rate,
            Beneficiary::Author(_) => self.default_author_rate,
        };
        ResolvedRate { rate, source: None }
    }
}
