//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PartnerId` where a `WorkId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user (author, partner owner, PDG, ...).");
typed_id!(PartnerId, "Unique identifier for a distribution partner.");
typed_id!(WorkId, "Unique identifier for a catalog work (book).");
typed_id!(OrderId, "Unique identifier for an order.");
typed_id!(RoyaltyId, "Unique identifier for a royalty ledger entry.");
typed_id!(RebateId, "Unique identifier for a partner rebate ledger entry.");
typed_id!(RebateRateId, "Unique identifier for a configured rebate rate.");
typed_id!(WithdrawalId, "Unique identifier for a withdrawal request.");
typed_id!(NotificationId, "Unique identifier for a notification.");
