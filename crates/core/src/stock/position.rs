//! Stock position calculator.

use folio_shared::types::{PartnerId, WorkId};
use serde::{Deserialize, Serialize};

use crate::stock::error::StockError;

/// Returns `allocated - sold + returned`.
///
/// No clamping: a negative result is a data-integrity error that callers must
/// surface, never a valid state.
#[must_use]
pub const fn compute_available(allocated: i64, sold: i64, returned: i64) -> i64 {
    allocated - sold + returned
}

/// Returns true iff the position can cover `requested` copies.
#[must_use]
pub const fn has_sufficient_stock(position: &StockPosition, requested: i64) -> bool {
    position.available() >= requested
}

/// Counters for one (partner, work) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    /// Owning partner.
    pub partner_id: PartnerId,
    /// Work held in stock.
    pub work_id: WorkId,
    /// Copies allocated to the partner.
    pub allocated_quantity: i64,
    /// Copies sold by the partner.
    pub sold_quantity: i64,
    /// Sold copies that came back.
    pub returned_quantity: i64,
}

/// A stock event applied to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMovement {
    /// Copies sent from the central stock to the partner.
    Allocate(i64),
    /// Copies sold by the partner.
    Sale(i64),
    /// Sold copies returned to the partner.
    Return(i64),
}

/// Movement type recorded in the stock movement log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Allocation to a partner.
    PartnerAllocation,
    /// Sale by a partner.
    PartnerSale,
    /// Return to a partner.
    PartnerReturn,
}

impl MovementKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PartnerAllocation => "PARTNER_ALLOCATION",
            Self::PartnerSale => "PARTNER_SALE",
            Self::PartnerReturn => "PARTNER_RETURN",
        }
    }
}

impl StockMovement {
    /// Returns the movement quantity.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        match self {
            Self::Allocate(n) | Self::Sale(n) | Self::Return(n) => *n,
        }
    }

    /// Returns the kind logged for this movement.
    #[must_use]
    pub const fn kind(&self) -> MovementKind {
        match self {
            Self::Allocate(_) => MovementKind::PartnerAllocation,
            Self::Sale(_) => MovementKind::PartnerSale,
            Self::Return(_) => MovementKind::PartnerReturn,
        }
    }

    /// Quantity as written to the movement log: sales leave the partner
    /// (negative), allocations and returns arrive (positive).
    #[must_use]
    pub const fn signed_quantity(&self) -> i64 {
        match self {
            Self::Sale(n) => -*n,
            Self::Allocate(n) | Self::Return(n) => *n,
        }
    }
}

impl StockPosition {
    /// Creates an empty position.
    #[must_use]
    pub const fn empty(partner_id: PartnerId, work_id: WorkId) -> Self {
        Self {
            partner_id,
            work_id,
            allocated_quantity: 0,
            sold_quantity: 0,
            returned_quantity: 0,
        }
    }

    /// Returns the available quantity.
    #[must_use]
    pub const fn available(&self) -> i64 {
        compute_available(
            self.allocated_quantity,
            self.sold_quantity,
            self.returned_quantity,
        )
    }

    /// Returns sold copies not yet returned.
    #[must_use]
    pub const fn returnable(&self) -> i64 {
        self.sold_quantity - self.returned_quantity
    }

    /// Reports stored counters that break the position invariants.
    pub fn check_integrity(&self) -> Result<(), StockError> {
        let available = self.available();
        if available < 0 {
            return Err(StockError::IntegrityViolation { available });
        }
        Ok(())
    }

    /// Validates `movement` and returns the resulting position.
    ///
    /// The receiver is left untouched; callers persist the returned value.
    pub fn apply(&self, movement: StockMovement) -> Result<Self, StockError> {
        let quantity = movement.quantity();
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }
        self.check_integrity()?;

        let mut next = *self;
        match movement {
            StockMovement::Allocate(n) => {
                next.allocated_quantity = self
                    .allocated_quantity
                    .checked_add(n)
                    .ok_or(StockError::Overflow)?;
            }
            StockMovement::Sale(n) => {
                if !has_sufficient_stock(self, n) {
                    return Err(StockError::InsufficientStock {
                        available: self.available(),
                        requested: n,
                    });
                }
                next.sold_quantity = self.sold_quantity.checked_add(n).ok_or(StockError::Overflow)?;
            }
            StockMovement::Return(n) => {
                if n > self.returnable() {
                    return Err(StockError::ExcessReturn {
                        returnable: self.returnable(),
                        requested: n,
                    });
                }
                next.returned_quantity = self
                    .returned_quantity
                    .checked_add(n)
                    .ok_or(StockError::Overflow)?;
            }
        }
        Ok(next)
    }

    /// Display status used by partner stock listings.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.available() > 0 {
            "Disponible"
        } else {
            "Épuisé"
        }
    }
}
