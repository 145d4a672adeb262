use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::UserRole;

/// Request DTO for email/password login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub email: String,
    /// Bearer token for the new session
    pub access_token: String,
}

/// Query for the Google callbacks. On the mobile callback `code` carries an ID token.
#[derive(Debug, Deserialize, IntoParams)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MobileAuthResponseDto {
    pub auth_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserMetaDto {
    /// Number of reviews the user has written
    pub reviews: i64,
    pub is_super_admin: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MySessionDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user_meta: UserMetaDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_validation() {
        let valid = LoginRequestDto {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let no_password = LoginRequestDto {
            email: "ana@example.com".to_string(),
            password: String::new(),
        };
        assert!(no_password.validate().is_err());
    }
}
