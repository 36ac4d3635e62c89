// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated requests.
//!
//! Use the `Auth` extractor in handlers to require a valid access token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::state::AppState;

/// Identity context attached to a request after successful authentication.
///
/// Owned by the current request; never cached across requests. The email is
/// taken from the store at verification time, not from the token, so it is
/// always current.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Extractor that authenticates the request's bearer token.
///
/// Verification steps:
/// 1. Extract the bearer credential from the `Authorization` header
/// 2. Verify the access token's signature and expiry
/// 3. Re-fetch the referenced user from the store
///
/// Step 3 trades one store lookup per request for the invariant that no
/// request is ever processed on behalf of a deleted account, even though the
/// access token itself is self-verifying until it expires.
#[derive(Debug)]
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::NoToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let claims = state.tokens.verify_access(token)?;

        // Defensive re-fetch: the account may have been deleted after the
        // token was issued.
        let store = state.store.read().await;
        let user = store.user_by_id(&claims.sub).ok_or(AuthError::UserNotFound)?;

        Ok(Auth(AuthenticatedUser {
            user_id: user.id.clone(),
            email: user.email.clone(),
        }))
    }
}
