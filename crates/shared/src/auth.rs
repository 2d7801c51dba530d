//! Authentication types carried by bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles allowed to physically delete cash operations.
const DELETE_ROLES: [&str; 2] = ["owner", "admin"];

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Agency ID (tenant context).
    pub agency: Uuid,
    /// User's role in the agency.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, agency_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            agency: agency_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the agency ID from claims.
    #[must_use]
    pub const fn agency_id(&self) -> Uuid {
        self.agency
    }

    /// Returns true if the role may delete cash operations.
    #[must_use]
    pub fn can_delete_operations(&self) -> bool {
        DELETE_ROLES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&self.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_with_role(role: &str) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            role,
            Utc::now() + Duration::minutes(5),
        )
    }

    #[test]
    fn test_claims_accessors() {
        let user_id = Uuid::new_v4();
        let agency_id = Uuid::new_v4();
        let claims = Claims::new(user_id, agency_id, "cashier", Utc::now());

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.agency_id(), agency_id);
        assert_eq!(claims.role, "cashier");
    }

    #[test]
    fn test_delete_permission() {
        assert!(claims_with_role("admin").can_delete_operations());
        assert!(claims_with_role("Owner").can_delete_operations());
        assert!(!claims_with_role("cashier").can_delete_operations());
        assert!(!claims_with_role("").can_delete_operations());
    }
}
