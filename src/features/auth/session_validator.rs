use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::TokenService;
use crate::features::users::models::UserRole;

#[derive(Debug, FromRow)]
struct SessionUserRow {
    user_id: Uuid,
    email: String,
    name: String,
    role: UserRole,
    active: bool,
    signout_at: Option<DateTime<Utc>>,
}

/// Resolves bearer tokens into authenticated users.
///
/// A token is accepted only when its signature and expiry check out, the
/// session it names is still open and the owning user is active.
pub struct SessionValidator {
    pool: PgPool,
    tokens: Arc<TokenService>,
    auth_config: AuthConfig,
}

impl SessionValidator {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, auth_config: AuthConfig) -> Self {
        Self {
            pool,
            tokens,
            auth_config,
        }
    }

    pub async fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.verify(token)?;

        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            SELECT u.id AS user_id, u.email, u.name, u.role, u.active, s.signout_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1 AND s.user_id = $2
            "#,
        )
        .bind(claims.session_id)
        .bind(claims.user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load session: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(unauthorized)?;

        if !row.active || row.signout_at.is_some() {
            return Err(unauthorized());
        }

        Ok(AuthenticatedUser {
            user_id: row.user_id,
            session_id: claims.session_id,
            is_super_admin: self.auth_config.is_super_admin_mail(&row.email),
            email: row.email,
            name: row.name,
            role: row.role,
        })
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized access!".to_string())
}
