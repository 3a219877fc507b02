//! Stateless access/refresh token service.
//!
//! Tokens are HS256 JWTs bound to a user id and an expiry. Verification is a
//! signature and expiry check only; nothing is persisted, so a token cannot
//! be revoked before it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default access token lifetime (seconds).
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3600; // 1 hour

/// Default refresh token lifetime (seconds).
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 30 * 24 * 3600; // 30 days

/// The message surfaced for any invalid, expired, or wrong-kind token.
pub const INVALID_TOKEN_MESSAGE: &str = "Token is invalid or expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
    iat: i64,
    kind: TokenKind,
}

/// An access/refresh token pair issued at registration and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies bearer tokens for a single signing secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Create a token service with default lifetimes (1h access, 30d refresh).
    pub fn new(secret: &str) -> Self {
        Self::with_ttls(
            secret,
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        )
    }

    /// Create a token service with explicit lifetimes.
    pub fn with_ttls(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::default();
        // No leeway: an expired token is rejected immediately.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            validation,
        }
    }

    fn issue(&self, user_id: Uuid, kind: TokenKind, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            kind,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| Error::Auth(INVALID_TOKEN_MESSAGE.to_string()))?;
        if data.claims.kind != expected {
            return Err(Error::Auth(INVALID_TOKEN_MESSAGE.to_string()));
        }
        Ok(data.claims.sub)
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access, self.access_ttl)?,
            refresh: self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    /// Verify an access token and return the bound user id.
    pub fn verify_access(&self, token: &str) -> Result<Uuid> {
        self.verify(token, TokenKind::Access)
    }

    /// Exchange a valid refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        let user_id = self.verify(refresh_token, TokenKind::Refresh)?;
        self.issue(user_id, TokenKind::Access, self.access_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let svc = service();
        let user_id = Uuid::now_v7();
        let pair = svc.issue_pair(user_id).unwrap();

        assert_eq!(svc.verify_access(&pair.access).unwrap(), user_id);
    }

    #[test]
    fn test_refresh_round_trip() {
        let svc = service();
        let user_id = Uuid::now_v7();
        let pair = svc.issue_pair(user_id).unwrap();

        let access = svc.refresh(&pair.refresh).unwrap();
        assert_eq!(svc.verify_access(&access).unwrap(), user_id);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service();
        let pair = svc.issue_pair(Uuid::now_v7()).unwrap();

        match svc.verify_access(&pair.refresh) {
            Err(Error::Auth(msg)) => assert_eq!(msg, INVALID_TOKEN_MESSAGE),
            other => panic!("Expected Auth error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let svc = service();
        let pair = svc.issue_pair(Uuid::now_v7()).unwrap();

        assert!(matches!(svc.refresh(&pair.access), Err(Error::Auth(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::with_ttls(
            "test-secret",
            Duration::seconds(-120),
            Duration::seconds(-120),
        );
        let pair = svc.issue_pair(Uuid::now_v7()).unwrap();

        assert!(matches!(
            svc.verify_access(&pair.access),
            Err(Error::Auth(_))
        ));
        assert!(matches!(svc.refresh(&pair.refresh), Err(Error::Auth(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = TokenService::new("other-secret");
        let pair = svc.issue_pair(Uuid::now_v7()).unwrap();

        assert!(matches!(
            other.verify_access(&pair.access),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service();
        assert!(matches!(
            svc.verify_access("not-a-token"),
            Err(Error::Auth(_))
        ));
    }
}
