//! Rebate and royalty accrual for an order.
//!
//! Each order line is aggregated per work. A partner order accrues one rebate
//! per (order, work); a work with an author accrues one royalty per
//! (order, work). Pairs that already have an entry are skipped, so planning
//! the same order twice yields an empty plan.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use folio_shared::Money;
use folio_shared::types::{OrderId, PartnerId, UserId, WorkId};
use rust_decimal::Decimal;

use crate::rebate::{Beneficiary, RateResolver, RebateError, RebateRate};
use crate::royalty::{RoyaltyBasis, WorkRoyaltyTerms, compute_royalty};

/// Order statuses that allow accrual.
pub const ACCRUABLE_ORDER_STATUSES: [&str; 4] = ["VALIDATED", "PROCESSING", "SHIPPED", "DELIVERED"];

/// One item of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Work sold.
    pub work_id: WorkId,
    /// Author of the work, if any.
    pub author_id: Option<UserId>,
    /// Copies sold.
    pub quantity: i64,
    /// Unit price.
    pub unit_price: Money,
    /// Royalty terms stored on the work.
    pub royalty_terms: Option<WorkRoyaltyTerms>,
}

/// An order as read for accrual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    /// Order id.
    pub order_id: OrderId,
    /// Ordering partner, if any.
    pub partner_id: Option<PartnerId>,
    /// Order status literal.
    pub status: String,
    /// Items.
    pub lines: Vec<OrderLine>,
}

/// Rebate to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRebate {
    /// Partner owed the rebate.
    pub partner_id: PartnerId,
    /// Work sold.
    pub work_id: WorkId,
    /// Amount.
    pub amount: Money,
    /// Percentage applied.
    pub rate: Decimal,
}

/// Royalty to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRoyalty {
    /// Author owed the royalty.
    pub author_id: UserId,
    /// Work sold.
    pub work_id: WorkId,
    /// Amount.
    pub amount: Money,
    /// Rate applied.
    pub rate: Decimal,
    /// Rate interpretation.
    pub basis: RoyaltyBasis,
}

/// Entries to create for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccrualPlan {
    /// Partner rebates.
    pub rebates: Vec<PlannedRebate>,
    /// Author royalties.
    pub royalties: Vec<PlannedRoyalty>,
}

impl AccrualPlan {
    /// Returns true if nothing is left to create.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rebates.is_empty() && self.royalties.is_empty()
    }

    /// Builds the plan for `order`.
    ///
    /// `existing_rebates` and `existing_royalties` hold the works that already
    /// have an entry for this order.
    ///
    /// # Errors
    ///
    /// * `RebateError::OrderNotEligible` if the order status does not allow accrual
    /// * `RebateError::Overflow` if an amount does not fit in `Money`
    pub fn build(
        order: &OrderSnapshot,
        rates: &[RebateRate],
        resolver: &RateResolver,
        existing_rebates: &BTreeSet<WorkId>,
        existing_royalties: &BTreeSet<WorkId>,
        now: DateTime<Utc>,
    ) -> Result<Self, RebateError> {
        if !ACCRUABLE_ORDER_STATUSES.contains(&order.status.as_str()) {
            return Err(RebateError::OrderNotEligible(order.status.clone()));
        }

        let mut plan = Self::default();
        for (work_id, sale) in aggregate_lines(&order.lines)? {
            if let Some(partner_id) = order.partner_id
                && !existing_rebates.contains(&work_id)
            {
                let rate = resolver
                    .resolve(rates, Beneficiary::Partner(partner_id), Some(work_id), now)
                    .rate;
                let amount = sale
                    .amount
                    .apply_percentage(rate)
                    .ok_or(RebateError::Overflow)?;
                plan.rebates.push(PlannedRebate {
                    partner_id,
                    work_id,
                    amount,
                    rate,
                });
            }

            if let Some(author_id) = sale.author_id
                && !existing_royalties.contains(&work_id)
            {
                let fallback = resolver
                    .resolve(rates, Beneficiary::Author(author_id), Some(work_id), now)
                    .rate;
                let quote = compute_royalty(sale.terms, sale.amount, sale.quantity, fallback)
                    .map_err(|_| RebateError::Overflow)?;
                plan.royalties.push(PlannedRoyalty {
                    author_id,
                    work_id,
                    amount: quote.amount,
                    rate: quote.rate,
                    basis: quote.basis,
                });
            }
        }
        Ok(plan)
    }
}

/// Sale totals of one work within an order.
struct WorkSale {
    author_id: Option<UserId>,
    terms: Option<WorkRoyaltyTerms>,
    quantity: i64,
    amount: Money,
}

fn aggregate_lines(lines: &[OrderLine]) -> Result<BTreeMap<WorkId, WorkSale>, RebateError> {
    let mut sales: BTreeMap<WorkId, WorkSale> = BTreeMap::new();
    for line in lines {
        let line_amount = line
            .unit_price
            .checked_mul_quantity(line.quantity)
            .ok_or(RebateError::Overflow)?;
        let sale = sales.entry(line.work_id).or_insert(WorkSale {
            author_id: line.author_id,
            terms: line.royalty_terms,
            quantity: 0,
            amount: Money::ZERO,
        });
        sale.quantity = sale
            .quantity
            .checked_add(line.quantity)
            .ok_or(RebateError::Overflow)?;
        sale.amount = sale
            .amount
            .checked_add(line_amount)
            .ok_or(RebateError::Overflow)?;
    }
    Ok(sales)
}
