use std::collections::HashSet;
use std::sync::Arc;

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::UploadedFile;
use crate::features::files::FileService;
use crate::features::places::models::{Place, Reaction};
use crate::features::places::services::delete_place_in_tx;
use crate::features::reviews::services::recompute_rating;
use crate::features::users::dtos::{
    AvatarResponseDto, ChangeInfoDto, ChangeRoleDto, ContributionSummaryDto, UserListFilter,
    UserListMetaDto, UserListQuery, UserResponseDto,
};
use crate::features::users::models::{User, UserRole};
use crate::modules::storage::{content_type_for, ObjectStorage};
use crate::shared::constants::{AVATARS_PREFIX, MAP_CONTENTS_PREFIX};
use crate::shared::links::{object_key, stored_filename, MediaLinks};
use crate::shared::query::{contains_pattern, keyword};
use crate::shared::types::resolve_limit;

const USER_SUMMARY_SELECT: &str = r#"
    SELECT u.*,
           (SELECT COUNT(*) FROM places p WHERE p.user_id = u.id) AS place_total,
           (SELECT COUNT(*) FROM place_reviews r WHERE r.user_id = u.id) AS review_total
    FROM users u
"#;

#[derive(Debug, FromRow)]
struct UserSummaryRow {
    #[sqlx(flatten)]
    user: User,
    place_total: i64,
    review_total: i64,
}

/// Service for user accounts managed by admins and by the users themselves
pub struct UserService {
    pool: PgPool,
    files: Arc<FileService>,
    storage: Arc<dyn ObjectStorage>,
    auth_config: AuthConfig,
    links: MediaLinks,
}

impl UserService {
    pub fn new(
        pool: PgPool,
        files: Arc<FileService>,
        storage: Arc<dyn ObjectStorage>,
        auth_config: AuthConfig,
        links: MediaLinks,
    ) -> Self {
        Self {
            pool,
            files,
            storage,
            auth_config,
            links,
        }
    }

    /// Active users, most recently updated first, with their contributions
    pub async fn list(&self, query: &UserListQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let filter = query.filter.as_deref().and_then(UserListFilter::parse);
        let keyword = keyword(query.keyword.as_deref());
        let limit = resolve_limit(query.limit);

        let mut builder = QueryBuilder::<Postgres>::new(USER_SUMMARY_SELECT);
        self.push_filters(&mut builder, filter, keyword);
        builder.push(" ORDER BY u.updated_at DESC, u.id");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<UserSummaryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u");
        self.push_filters(&mut count, filter, keyword);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(|row| self.to_dto(row)).collect(), total))
    }

    fn push_filters(
        &self,
        builder: &mut QueryBuilder<'_, Postgres>,
        filter: Option<UserListFilter>,
        keyword: Option<&str>,
    ) {
        builder.push(" WHERE u.active = TRUE");

        if let Some(keyword) = keyword {
            let pattern = contains_pattern(keyword);
            builder
                .push(" AND (u.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        let super_admins = self.auth_config.super_admin_mails.clone();
        match filter {
            Some(UserListFilter::User) => {
                builder.push(" AND u.role = ").push_bind(UserRole::User);
            }
            Some(UserListFilter::Admin) => {
                builder
                    .push(" AND u.role = ")
                    .push_bind(UserRole::Admin)
                    .push(" AND NOT (LOWER(u.email) = ANY(")
                    .push_bind(super_admins)
                    .push("))");
            }
            Some(UserListFilter::SuperAdmin) => {
                builder
                    .push(" AND LOWER(u.email) = ANY(")
                    .push_bind(super_admins)
                    .push(")");
            }
            None => {}
        }
    }

    /// Replace the caller's avatar. The previous object is removed best effort.
    pub async fn update_avatar(
        &self,
        user_id: Uuid,
        upload: UploadedFile,
        extension: &str,
    ) -> Result<AvatarResponseDto> {
        let user = self.find_user(user_id).await?;

        let filename = stored_filename("avatar", extension);
        let key = object_key(AVATARS_PREFIX, &filename);
        self.storage
            .upload(&key, upload.data, content_type_for(&filename))
            .await?;

        let updated = sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(&filename)
            .execute(&self.pool)
            .await;

        if let Err(e) = updated {
            tracing::error!("Failed to update avatar: {:?}", e);
            if let Err(e) = self.storage.delete(&key).await {
                warn!("Failed to delete avatar '{}': {}", filename, e);
            }
            return Err(AppError::Database(e));
        }

        if let Some(old) = user.avatar {
            self.files
                .spawn_delete_objects(vec![object_key(AVATARS_PREFIX, &old)]);
        }

        info!("User {} changed avatar", user_id);
        Ok(AvatarResponseDto {
            avatar: self.links.avatar(Some(&filename)),
        })
    }

    pub async fn change_info(&self, user_id: Uuid, dto: ChangeInfoDto) -> Result<()> {
        let result = sqlx::query("UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(dto.name.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update user info: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    /// Grant or revoke admin. Super admins keep their role.
    pub async fn change_role(
        &self,
        caller: &AuthenticatedUser,
        target_id: Uuid,
        dto: ChangeRoleDto,
    ) -> Result<()> {
        let target = self.find_user(target_id).await?;
        self.ensure_role_changeable(caller, &target)?;

        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(target.id)
            .bind(dto.role)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to change user role: {:?}", e);
                AppError::Database(e)
            })?;

        info!("User {} is now {} (by {})", target.id, dto.role, caller.user_id);
        Ok(())
    }

    /// Delete a user and everything they contributed, in one transaction.
    ///
    /// Their places go with all reviews and engagement; their reactions and
    /// bookmarks on other places are reversed; their reviews are removed and
    /// the affected ratings recomputed. File rows go with the user, the
    /// objects are removed after commit.
    pub async fn delete(&self, caller: &AuthenticatedUser, target_id: Uuid) -> Result<()> {
        let target = self.find_user(target_id).await?;
        self.ensure_deletable(caller, &target)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let places = sqlx::query_as::<_, Place>("SELECT * FROM places WHERE user_id = $1 FOR UPDATE")
            .bind(target.id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user places: {:?}", e);
                AppError::Database(e)
            })?;

        let mut affected_users = HashSet::new();
        for place in &places {
            affected_users.extend(delete_place_in_tx(&mut *tx, place).await?);
        }

        sqlx::query(
            r#"
            UPDATE places p
            SET likes = p.likes - CASE WHEN r.reaction = $2 THEN 1 ELSE 0 END,
                dislikes = p.dislikes - CASE WHEN r.reaction = $3 THEN 1 ELSE 0 END
            FROM place_reactions r
            WHERE r.place_id = p.id AND r.user_id = $1
            "#,
        )
        .bind(target.id)
        .bind(Reaction::Like)
        .bind(Reaction::Dislike)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reverse reactions: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            r#"
            UPDATE places p SET saved = p.saved - 1
            FROM place_bookmarks b
            WHERE b.place_id = p.id AND b.user_id = $1
            "#,
        )
        .bind(target.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reverse bookmarks: {:?}", e);
            AppError::Database(e)
        })?;

        for table in ["place_reactions", "place_bookmarks"] {
            sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
                .bind(target.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete from {}: {:?}", table, e);
                    AppError::Database(e)
                })?;
        }

        let reviewed: Vec<Uuid> =
            sqlx::query_scalar("DELETE FROM place_reviews WHERE user_id = $1 RETURNING place_id")
                .bind(target.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete user reviews: {:?}", e);
                    AppError::Database(e)
                })?;

        let reviewed: HashSet<Uuid> = reviewed.into_iter().collect();
        for place_id in &reviewed {
            recompute_rating(&mut *tx, *place_id).await?;
        }

        let filenames: Vec<String> =
            sqlx::query_scalar("DELETE FROM files WHERE user_id = $1 RETURNING filename")
                .bind(target.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to release user files: {:?}", e);
                    AppError::Database(e)
                })?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(target.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit user deletion: {:?}", e);
            AppError::Database(e)
        })?;

        let mut keys: Vec<String> = filenames
            .iter()
            .map(|name| object_key(MAP_CONTENTS_PREFIX, name))
            .collect();
        if let Some(avatar) = &target.avatar {
            keys.push(object_key(AVATARS_PREFIX, avatar));
        }
        self.files.spawn_delete_objects(keys);

        affected_users.remove(&target.id);
        self.files.spawn_cleanup(affected_users);

        info!(
            "User {} deleted by {}: {} places, {} reviews, {} files",
            target.id,
            caller.user_id,
            places.len(),
            reviewed.len(),
            filenames.len()
        );
        Ok(())
    }

    fn ensure_role_changeable(&self, caller: &AuthenticatedUser, target: &User) -> Result<()> {
        if self.auth_config.is_super_admin_mail(&target.email) {
            return Err(AppError::BadRequest(
                "Cannot change the role of a super admin".to_string(),
            ));
        }
        if !caller.is_super_admin {
            return Err(AppError::Forbidden(
                "Only super admins can change user roles".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_deletable(&self, caller: &AuthenticatedUser, target: &User) -> Result<()> {
        if target.id == caller.user_id {
            return Err(AppError::BadRequest(
                "Cannot delete your own account".to_string(),
            ));
        }
        if self.auth_config.is_super_admin_mail(&target.email) {
            return Err(AppError::BadRequest(
                "Cannot delete a super admin account".to_string(),
            ));
        }
        if !caller.is_super_admin {
            return Err(AppError::Forbidden(
                "Only super admins can delete users".to_string(),
            ));
        }
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(user_not_found)
    }

    fn to_dto(&self, row: UserSummaryRow) -> UserResponseDto {
        let user = row.user;
        UserResponseDto {
            avatar: self.links.avatar(user.avatar.as_deref()),
            user_meta: UserListMetaDto {
                is_super_admin: self.auth_config.is_super_admin_mail(&user.email),
            },
            contribution_summary: ContributionSummaryDto {
                place_total: row.place_total,
                review_total: row.review_total,
            },
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{
        create_super_admin_user, create_test_user, lazy_pool, test_links,
    };

    const ROOT_MAIL: &str = "root@example.com";

    fn service() -> UserService {
        let pool = lazy_pool();
        let storage: Arc<dyn ObjectStorage> = Arc::new(MemoryStorage::new());
        let files = Arc::new(FileService::new(pool.clone(), storage.clone(), test_links()));
        UserService::new(
            pool,
            files,
            storage,
            AuthConfig {
                jwt_secret: "secret".to_string(),
                password_token_ttl: Duration::from_secs(60),
                google_token_ttl: Duration::from_secs(60),
                super_admin_mails: vec![ROOT_MAIL.to_string()],
            },
            test_links(),
        )
    }

    fn account(id: Uuid, email: &str, role: UserRole) -> User {
        User {
            id,
            avatar: None,
            role,
            name: "Someone".to_string(),
            email: email.to_string(),
            password_hash: None,
            active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_super_admin_cannot_delete_self() {
        let service = service();
        let caller = create_super_admin_user();
        let target = account(caller.user_id, ROOT_MAIL, UserRole::Admin);

        assert!(matches!(
            service.ensure_deletable(&caller, &target),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_super_admin_accounts_are_protected() {
        let service = service();
        let caller = create_super_admin_user();
        let target = account(Uuid::new_v4(), "Root@Example.com", UserRole::Admin);

        assert!(matches!(
            service.ensure_deletable(&caller, &target),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.ensure_role_changeable(&caller, &target),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_plain_admin_cannot_manage_accounts() {
        let service = service();
        let caller = create_test_user(UserRole::Admin);
        let target = account(Uuid::new_v4(), "member@example.com", UserRole::User);

        assert!(matches!(
            service.ensure_deletable(&caller, &target),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.ensure_role_changeable(&caller, &target),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_super_admin_manages_regular_accounts() {
        let service = service();
        let caller = create_super_admin_user();
        let target = account(Uuid::new_v4(), "member@example.com", UserRole::User);

        assert!(service.ensure_deletable(&caller, &target).is_ok());
        assert!(service.ensure_role_changeable(&caller, &target).is_ok());
    }

    #[tokio::test]
    async fn test_summary_dto_marks_super_admins() {
        let service = service();
        let dto = service.to_dto(UserSummaryRow {
            user: account(Uuid::new_v4(), ROOT_MAIL, UserRole::Admin),
            place_total: 3,
            review_total: 12,
        });

        assert!(dto.user_meta.is_super_admin);
        assert_eq!(dto.contribution_summary.place_total, 3);
        assert_eq!(dto.contribution_summary.review_total, 12);
        assert_eq!(dto.avatar, test_links().avatar(None));
    }
}
