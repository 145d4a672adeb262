use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::auth::clients::{GoogleOAuthClient, GoogleProfile};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto, MySessionDto, UserMetaDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::verify_password;
use crate::features::auth::services::TokenService;
use crate::features::users::models::{User, UserRole};
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::AVATARS_PREFIX;
use crate::shared::links::{object_key, stored_filename, MediaLinks};

/// Service for sign-in, sign-out and the current session
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    google: Arc<GoogleOAuthClient>,
    storage: Arc<dyn ObjectStorage>,
    auth_config: AuthConfig,
    links: MediaLinks,
    web_base_url: String,
}

impl AuthService {
    pub fn new(
        pool: PgPool,
        tokens: Arc<TokenService>,
        google: Arc<GoogleOAuthClient>,
        storage: Arc<dyn ObjectStorage>,
        auth_config: AuthConfig,
        links: MediaLinks,
        web_base_url: String,
    ) -> Self {
        Self {
            pool,
            tokens,
            google,
            storage,
            auth_config,
            links,
            web_base_url,
        }
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto, client: ClientInfo) -> Result<LoginResponseDto> {
        let user = self
            .find_user_by_email(&dto.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let password_ok = match user.password_hash.clone() {
            Some(hash) => {
                let password = dto.password;
                tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                    .await
                    .map_err(|e| AppError::Internal(format!("Password check failed: {}", e)))?
            }
            None => false,
        };

        if !password_ok {
            return Err(invalid_credentials());
        }

        if !user.active {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        let access_token = self
            .open_session(&user, &client, self.auth_config.password_token_ttl)
            .await?;

        tracing::info!("User {} signed in with password", user.id);

        Ok(LoginResponseDto {
            email: user.email,
            access_token,
        })
    }

    pub fn google_authorization_url(&self) -> Result<String> {
        self.google.authorization_url()
    }

    /// Complete the browser OAuth flow and open a session
    pub async fn google_web_login(&self, code: &str, client: ClientInfo) -> Result<String> {
        let profile = self.google.exchange_code(code).await?;
        self.google_login(profile, client).await
    }

    /// Sign in the mobile app with a Google ID token
    pub async fn google_mobile_login(&self, id_token: &str, client: ClientInfo) -> Result<String> {
        let profile = self.google.verify_id_token(id_token).await?;
        self.google_login(profile, client).await
    }

    /// Web client URL the OAuth callback redirects to
    pub fn web_redirect_url(&self, outcome: &Result<String>) -> String {
        auth_redirect_url(&self.web_base_url, outcome)
    }

    pub async fn my_session(&self, user: &AuthenticatedUser) -> Result<MySessionDto> {
        let account = self
            .find_user_by_id(user.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unauthorized access!".to_string()))?;

        let reviews: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM place_reviews WHERE user_id = $1")
                .bind(user.user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count user reviews: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok(MySessionDto {
            avatar: self.links.avatar(account.avatar.as_deref()),
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
            user_meta: UserMetaDto {
                reviews,
                is_super_admin: user.is_super_admin,
            },
        })
    }

    /// Close the caller's session; its token stops working immediately
    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        sqlx::query("UPDATE sessions SET signout_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user.session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to sign out session: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Session {} signed out", user.session_id);
        Ok(())
    }

    async fn google_login(&self, profile: GoogleProfile, client: ClientInfo) -> Result<String> {
        let user = match self.find_user_by_email(&profile.email).await? {
            Some(user) => user,
            None => self.create_google_user(&profile).await?,
        };

        if !user.active {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        let token = self
            .open_session(&user, &client, self.auth_config.google_token_ttl)
            .await?;

        tracing::info!("User {} signed in with Google", user.id);
        Ok(token)
    }

    async fn create_google_user(&self, profile: &GoogleProfile) -> Result<User> {
        let role = if self.auth_config.is_super_admin_mail(&profile.email) {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let avatar = match profile.picture.as_deref() {
            Some(url) => self.store_google_avatar(url).await,
            None => None,
        };

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(role)
        .bind(&avatar)
        .fetch_one(&self.pool)
        .await;

        let user = match inserted {
            Ok(user) => user,
            // A concurrent first sign-in created the account
            Err(e) if is_unique_violation(&e) => {
                return self
                    .find_user_by_email(&profile.email)
                    .await?
                    .ok_or_else(|| AppError::Internal("User vanished after insert".to_string()));
            }
            Err(e) => {
                tracing::error!("Failed to create Google user: {:?}", e);
                return Err(AppError::Database(e));
            }
        };

        tracing::info!("Created user {} from Google sign-in as {}", user.id, user.role);
        Ok(user)
    }

    /// Copy the Google profile picture into avatar storage. Failures leave the user without an avatar.
    async fn store_google_avatar(&self, url: &str) -> Option<String> {
        let (data, content_type) = match self.google.download_picture(url).await {
            Ok(picture) => picture,
            Err(e) => {
                tracing::warn!("Skipping Google avatar: {}", e);
                return None;
            }
        };

        let extension = if content_type.contains("png") { "png" } else { "jpg" };
        let filename = stored_filename("avatar", extension);

        match self
            .storage
            .upload(&object_key(AVATARS_PREFIX, &filename), data, &content_type)
            .await
        {
            Ok(()) => Some(filename),
            Err(e) => {
                tracing::warn!("Failed to store Google avatar: {}", e);
                None
            }
        }
    }

    /// Create a session row and stamp the login time in one transaction
    async fn open_session(&self, user: &User, client: &ClientInfo, ttl: Duration) -> Result<String> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let session_id = insert_session(&mut tx, user.id, client).await?;

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update last login: {:?}", e);
                AppError::Database(e)
            })?;

        let token = self.tokens.issue(session_id, user.id, &user.email, ttl)?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit session: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(token)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user by email: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user: {:?}", e);
                AppError::Database(e)
            })
    }
}

async fn insert_session(conn: &mut PgConnection, user_id: Uuid, client: &ClientInfo) -> Result<Uuid> {
    sqlx::query_scalar(
        r#"
        INSERT INTO sessions (user_id, ip_address, user_agent)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&client.ip_address)
    .bind(&client.user_agent)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create session: {:?}", e);
        AppError::Database(e)
    })
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn auth_redirect_url(web_base_url: &str, outcome: &Result<String>) -> String {
    match outcome {
        Ok(token) => format!(
            "{}/#/auth?accessToken={}",
            web_base_url,
            urlencoding::encode(token)
        ),
        Err(_) => format!("{}/#/auth?error=auth_failed", web_base_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_carries_token() {
        let url = auth_redirect_url("https://jelajah.app", &Ok("abc.def.ghi".to_string()));
        assert_eq!(url, "https://jelajah.app/#/auth?accessToken=abc.def.ghi");
    }

    #[test]
    fn test_redirect_reports_failure() {
        let url = auth_redirect_url(
            "https://jelajah.app",
            &Err(AppError::Unauthorized("nope".to_string())),
        );
        assert_eq!(url, "https://jelajah.app/#/auth?error=auth_failed");
    }
}
