use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::UserRole;

/// Caller identity attached to the request by the session middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Email is listed in `SUPER_ADMIN_MAILS`
    pub is_super_admin: bool,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Owners manage their own content; admins manage everything
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role,
            is_super_admin: false,
        }
    }

    #[test]
    fn test_can_manage() {
        let owner = user(UserRole::User);
        let other = user(UserRole::User);
        let admin = user(UserRole::Admin);

        assert!(owner.can_manage(owner.user_id));
        assert!(!other.can_manage(owner.user_id));
        assert!(admin.can_manage(owner.user_id));
    }
}
