use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{UserBrief, UserRole};
use crate::shared::links::MediaLinks;
use crate::shared::types::deserialize_limit;
use crate::shared::validation::validate_not_blank;

/// Author or owner shown next to places, reviews and images
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBriefDto {
    pub id: Uuid,
    pub name: String,
    /// Avatar link, or the placeholder picture
    pub avatar: String,
}

impl UserBriefDto {
    pub fn from_brief(user: UserBrief, links: &MediaLinks) -> Self {
        Self {
            avatar: links.avatar(user.avatar.as_deref()),
            id: user.id,
            name: user.name,
        }
    }
}

/// Role filter accepted by the user list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserListFilter {
    User,
    /// Admins that are not super admins
    Admin,
    SuperAdmin,
}

impl UserListFilter {
    /// Unknown values are ignored
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "role:user" => Some(Self::User),
            "role:admin" => Some(Self::Admin),
            "role:super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// `role:user`, `role:admin` or `role:super_admin`
    pub filter: Option<String>,
    /// Matches name or email
    pub keyword: Option<String>,
    /// Non-numeric values fall back to the default limit
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContributionSummaryDto {
    pub place_total: i64,
    pub review_total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListMetaDto {
    pub is_super_admin: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: String,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub contribution_summary: ContributionSummaryDto,
    pub user_meta: UserListMetaDto,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeInfoDto {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRoleDto {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChangeRoleQuery {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponseDto {
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_list_filter_parse() {
        assert_eq!(UserListFilter::parse("role:user"), Some(UserListFilter::User));
        assert_eq!(UserListFilter::parse("role:admin"), Some(UserListFilter::Admin));
        assert_eq!(
            UserListFilter::parse(" role:super_admin "),
            Some(UserListFilter::SuperAdmin)
        );
        assert_eq!(UserListFilter::parse("role:owner"), None);
    }

    #[test]
    fn test_change_info_rejects_blank_name() {
        assert!(ChangeInfoDto {
            name: "  ".to_string()
        }
        .validate()
        .is_err());
        assert!(ChangeInfoDto {
            name: "Ana".to_string()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_change_role_parses_uppercase() {
        let dto: ChangeRoleDto = serde_json::from_str(r#"{"role":"ADMIN"}"#).unwrap();
        assert_eq!(dto.role, UserRole::Admin);
        assert!(serde_json::from_str::<ChangeRoleDto>(r#"{"role":"OWNER"}"#).is_err());
    }
}
