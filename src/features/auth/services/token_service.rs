use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::SessionClaims;

/// Signs and verifies HS256 session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a token bound to a session, valid for `ttl`
    pub fn issue(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        email: &str,
        ttl: Duration,
    ) -> Result<String> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            session_id,
            user_id,
            email: email.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                AppError::Unauthorized("Unauthorized access!".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new("test-secret");
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let token = service
            .issue(session_id, user_id, "ana@example.com", DAY)
            .unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.session_id, session_id);
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.exp - claims.iat, DAY.as_secs());
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let issuer = TokenService::new("secret-a");
        let verifier = TokenService::new("secret-b");

        let token = issuer
            .issue(Uuid::new_v4(), Uuid::new_v4(), "a@example.com", DAY)
            .unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let service = TokenService::new("test-secret");
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };

        let token = service.sign(&claims).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let service = TokenService::new("test-secret");
        assert!(service.verify("not-a-token").is_err());
    }
}
