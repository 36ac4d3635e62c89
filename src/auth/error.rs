// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// These errors never propagate past the auth boundary as panics or opaque
/// 500s: each maps to a structured 401/403 response with a stable `code`
/// field the client can branch on.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    NoToken,
    /// Authorization header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token is malformed or its signature is invalid
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Refresh token record is revoked or unknown
    TokenRevoked,
    /// Token verified but the referenced user no longer exists
    UserNotFound,
    /// Internal error during verification
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    code: String,
}

impl AuthError {
    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NoToken => "NO_TOKEN",
            // A malformed header and a malformed token are the same failure
            // class as far as clients are concerned.
            AuthError::InvalidAuthHeader | AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NoToken
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NoToken => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Token is malformed or its signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::UserNotFound => write!(f, "User referenced by token no longer exists"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn no_token_returns_401_with_code() {
        let response = AuthError::NoToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["code"], "NO_TOKEN");
    }

    #[test]
    fn invalid_header_and_invalid_token_share_a_code() {
        assert_eq!(AuthError::InvalidAuthHeader.error_code(), "INVALID_TOKEN");
        assert_eq!(AuthError::InvalidToken.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn revoked_and_expired_are_distinct_codes() {
        assert_eq!(AuthError::TokenRevoked.error_code(), "TOKEN_REVOKED");
        assert_eq!(AuthError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(
            AuthError::TokenRevoked.status_code(),
            AuthError::TokenExpired.status_code()
        );
    }
}
