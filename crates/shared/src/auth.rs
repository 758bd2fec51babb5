//! Identity types: token claims, roles and the explicit auth context.
//!
//! Handlers never read a global session. They build an [`AuthContext`] from
//! the verified token plus the user's stored roles and pass it into every
//! ledger mutation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::types::UserId;

/// Claims carried by identity provider access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issued at timestamp.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Audience.
    #[serde(default)]
    pub aud: Option<String>,
    /// Email of the signed-in user, when the provider includes it.
    #[serde(default)]
    pub email: Option<String>,
}

impl Claims {
    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// Application roles stored in `user_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to reconciliation and reporting.
    Admin,
    /// Field volunteer handling followup actions.
    Volunteer,
    /// Registered donor.
    Donor,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Volunteer => "volunteer",
            Self::Donor => "donor",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "volunteer" => Some(Self::Volunteer),
            "donor" => Some(Self::Donor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller's identity and roles for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user.
    pub user_id: UserId,
    /// Roles granted to the user.
    pub roles: Vec<Role>,
}

impl AuthContext {
    /// Creates a context for a user holding the given roles.
    #[must_use]
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    /// Returns true if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if the user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Fails with `AppError::Forbidden` unless the user holds `role`.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{role} role required")))
        }
    }
}
