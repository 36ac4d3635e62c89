// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Access/refresh token sessions for the Relational CRM API.
//!
//! ## Auth Flow
//!
//! 1. Client registers, then logs in with email + password
//! 2. Server mints a token pair:
//!    - access token: short-lived HS256 JWT, stateless
//!    - refresh token: long-lived HS256 JWT tracked server-side by `jti`
//! 3. Client sends `Authorization: Bearer <access token>` on every request
//! 4. When the access token expires, the client exchanges the refresh token
//!    for a new pair; the old refresh token is revoked in the same step
//!    (one-time-use rotation)
//!
//! ## Security
//!
//! - Access token verification re-fetches the user from the store, so no
//!   request is ever served on behalf of a deleted account
//! - Refresh tokens are revocable independently of their expiry: rotation,
//!   logout, and logout-everywhere all mark the server-side record revoked
//! - Revocation is permanent; a consumed refresh token can never be replayed
//! - Expired records are swept on a timer purely to bound memory

pub mod error;
pub mod extractor;
pub mod registry;
pub mod sweeper;
pub mod tokens;

pub use error::AuthError;
pub use extractor::{Auth, AuthenticatedUser};
pub use registry::{RefreshTokenRecord, RefreshTokenRegistry};
pub use sweeper::RegistrySweeper;
pub use tokens::{TokenIssuer, TokenPair};
