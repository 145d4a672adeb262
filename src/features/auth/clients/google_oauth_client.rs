use crate::core::config::GoogleOAuthConfig;
use crate::core::error::{AppError, Result};
use serde::Deserialize;

const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

/// Identity returned by Google for a signed-in account
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleProfile {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    aud: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Client for the Google OAuth2 endpoints used by sign-in
pub struct GoogleOAuthClient {
    config: GoogleOAuthConfig,
    http_client: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn ensure_configured(&self) -> Result<()> {
        if !self.config.is_configured() {
            return Err(AppError::BadRequest(
                "Google sign-in is not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Consent page URL the browser is redirected to
    pub fn authorization_url(&self) -> Result<String> {
        self.ensure_configured()?;
        Ok(build_authorization_url(&self.config))
    }

    /// Exchange an authorization code and load the account profile
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile> {
        self.ensure_configured()?;

        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to exchange Google authorization code: {}", e);
                AppError::ExternalServiceError(format!("Failed to exchange code: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Google token endpoint error: HTTP {} - {}", status, body);
            return Err(AppError::Unauthorized(
                "Google authorization failed".to_string(),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Google token response: {}", e))
        })?;

        let response = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch Google user info: {}", e);
                AppError::ExternalServiceError(format!("Failed to fetch user info: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Google userinfo endpoint error: HTTP {}", status);
            return Err(AppError::Unauthorized(
                "Google authorization failed".to_string(),
            ));
        }

        let info: UserInfoResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Google user info: {}", e))
        })?;

        profile_from_parts(info.email, info.name, info.picture)
    }

    /// Verify an ID token issued to the mobile app and load its profile.
    ///
    /// Tokens minted for another client id are rejected.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleProfile> {
        self.ensure_configured()?;

        let response = self
            .http_client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to verify Google ID token: {}", e);
                AppError::ExternalServiceError(format!("Failed to verify ID token: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::debug!("Google tokeninfo rejected token: HTTP {}", response.status());
            return Err(AppError::BadRequest("Invalid Google ID token".to_string()));
        }

        let info: TokenInfoResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Google token info: {}", e))
        })?;

        if info.aud != self.config.client_id {
            tracing::warn!("Google ID token audience mismatch: {}", info.aud);
            return Err(AppError::BadRequest("Invalid Google ID token".to_string()));
        }

        profile_from_parts(info.email, info.name, info.picture)
            .map_err(|_| AppError::BadRequest("Invalid Google ID token".to_string()))
    }

    /// Download a profile picture. Returns the bytes and reported content type.
    pub async fn download_picture(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to download picture: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Failed to download picture: HTTP {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response.bytes().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to read picture: {}", e))
        })?;

        Ok((bytes.to_vec(), content_type))
    }
}

fn build_authorization_url(config: &GoogleOAuthConfig) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        AUTHORIZATION_URL,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_url),
        urlencoding::encode(SCOPES),
    )
}

fn profile_from_parts(
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
) -> Result<GoogleProfile> {
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Google account has no email".to_string()))?;

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(GoogleProfile {
        email,
        name,
        picture: picture.filter(|p| !p.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "http://localhost:3000/api/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = build_authorization_url(&config());

        assert!(url.starts_with(AUTHORIZATION_URL));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("userinfo.email"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn test_profile_requires_email() {
        assert!(profile_from_parts(None, Some("A".into()), None).is_err());

        let profile =
            profile_from_parts(Some(" Ana@Example.com ".into()), None, Some(String::new()))
                .unwrap();
        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(profile.name, "ana");
        assert_eq!(profile.picture, None);
    }

    #[test]
    fn test_unconfigured_client_rejects() {
        let client = GoogleOAuthClient::new(GoogleOAuthConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
        });
        assert!(matches!(
            client.authorization_url(),
            Err(AppError::BadRequest(_))
        ));
    }
}
