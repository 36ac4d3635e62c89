// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Both token kinds are HS256 JWTs signed with the server secret. The access
//! token is stateless; the refresh token carries a `jti` that keys a
//! server-side [`RefreshTokenRecord`](super::registry::RefreshTokenRecord)
//! so it can be revoked independently of its expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;
use super::registry::{RefreshTokenRecord, RefreshTokenRegistry};
use crate::config::AuthSettings;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID.
    pub sub: String,
    pub email: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Token ID keying the server-side registry record.
    pub jti: String,
    /// User ID.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token expires.
    pub access_token_expiry: i64,
}

/// Signs and verifies access/refresh tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.token_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.token_secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    /// Mint an access/refresh token pair for a user.
    ///
    /// Side effect: inserts a [`RefreshTokenRecord`] keyed by the refresh
    /// token's `jti` into the registry, so the token can be revoked later.
    pub fn issue_pair(
        &self,
        user_id: &str,
        email: &str,
        registry: &RefreshTokenRegistry,
    ) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_expiry = now + self.access_ttl;
        let refresh_expiry = now + self.refresh_ttl;

        let access_claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: access_expiry.timestamp(),
        };

        let token_id = Uuid::new_v4().to_string();
        let refresh_claims = RefreshClaims {
            jti: token_id.clone(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: refresh_expiry.timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        registry.insert(RefreshTokenRecord {
            token_id,
            user_id: user_id.to_string(),
            issued_at: now,
            expires_at: refresh_expiry,
            revoked: false,
        });

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expiry: access_expiry.timestamp(),
        })
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Decode a refresh token's signature and expiry.
    ///
    /// This checks only the stateless half; callers must still consume the
    /// `jti` through the registry before trusting the token.
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.decoding, &self.validation())
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are issued and verified by the same process; no skew leeway.
        validation.leeway = 0;
        validation.validate_aud = false;
        validation
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthSettings::for_tests())
    }

    #[test]
    fn issued_access_token_verifies_to_same_user() {
        let registry = RefreshTokenRegistry::new();
        let pair = issuer()
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        let claims = issuer().verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "1000000001");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp, pair.access_token_expiry);
    }

    #[test]
    fn issue_pair_registers_refresh_record() {
        let registry = RefreshTokenRegistry::new();
        let pair = issuer()
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        let claims = issuer().decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, "1000000001");

        // The record inserted as a side effect must be consumable exactly once.
        let record = registry.consume(&claims.jti).unwrap();
        assert_eq!(record.user_id, "1000000001");
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut settings = AuthSettings::for_tests();
        settings.access_ttl = Duration::minutes(-5);
        let expired_issuer = TokenIssuer::new(&settings);

        let registry = RefreshTokenRegistry::new();
        let pair = expired_issuer
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        let err = expired_issuer.verify_access(&pair.access_token).unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let registry = RefreshTokenRegistry::new();
        let pair = issuer()
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        // Corrupt the signature segment.
        let mut tampered = pair.access_token.clone();
        tampered.pop();
        tampered.push(if tampered.ends_with('A') { 'B' } else { 'A' });

        let err = issuer().verify_access(&tampered).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let registry = RefreshTokenRegistry::new();
        let mut other_settings = AuthSettings::for_tests();
        other_settings.token_secret = "a-completely-different-secret".to_string();
        let other = TokenIssuer::new(&other_settings);

        let pair = other
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        let err = issuer().verify_access(&pair.access_token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn access_token_does_not_verify_as_refresh() {
        let registry = RefreshTokenRegistry::new();
        let pair = issuer()
            .issue_pair("1000000001", "alice@example.com", &registry)
            .unwrap();

        // Access claims carry no `jti`, so refresh decoding must fail.
        let err = issuer().decode_refresh(&pair.access_token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }
}
