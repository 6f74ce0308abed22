//! Identity types: roles, JWT claims and the explicit actor context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::types::UserId;

/// Platform role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Executive; approves and pays ledgers, allocates stock.
    Pdg,
    /// Author of works; earns royalties.
    Auteur,
    /// Designer.
    Concepteur,
    /// Sales representative.
    Representant,
    /// Distribution partner; holds stock and earns rebates.
    Partenaire,
    /// End customer.
    Client,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pdg => "PDG",
            Self::Auteur => "AUTEUR",
            Self::Concepteur => "CONCEPTEUR",
            Self::Representant => "REPRESENTANT",
            Self::Partenaire => "PARTENAIRE",
            Self::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// User's role.
    pub role: Role,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the actor described by these claims.
    #[must_use]
    pub const fn actor(&self) -> ActorContext {
        ActorContext::new(self.sub, self.role)
    }
}

/// Authenticated identity passed explicitly into every ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    /// Acting user.
    pub id: UserId,
    /// Acting user's role.
    pub role: Role,
}

impl ActorContext {
    /// Creates an actor context.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns true if the actor holds one of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Fails with `Forbidden` unless the actor holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            let expected: Vec<&str> = roles.iter().map(Role::as_str).collect();
            Err(AppError::Forbidden(format!(
                "Accès refusé - rôle requis: {}",
                expected.join(" ou ")
            )))
        }
    }
}
